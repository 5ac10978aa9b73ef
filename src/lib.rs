pub mod boss;
pub mod camera_systems;
pub mod combat;
pub mod components;
pub mod effects;
pub mod enemy;
pub mod executors;
pub mod gacha;
pub mod game;
pub mod geometry;
pub mod input;
pub mod npc;
pub mod persistence;
pub mod player;
pub mod quests;
pub mod scheduler;
pub mod simulation;
pub mod skills;
pub mod visual_effects;
