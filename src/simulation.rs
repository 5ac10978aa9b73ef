//! The simulation context: every piece of mutable game state, advanced one fixed frame at a time.
//!
//! Nothing in here touches the window, the clock or the disk. Presentation systems read the
//! public fields; the persistence layer watches [`Simulation::take_save_request`].

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;
use thiserror::Error;

use crate::boss::{BossState, BOSS_ATTACK_DAMAGE, BOSS_ATTACK_RADIUS};
use crate::combat;
use crate::components::{EnemyId, TargetRef};
use crate::effects::{Effects, ExpandingAoe};
use crate::enemy::{edge_spawn_position, Enemy, EnemySpawner, MAX_ENEMIES};
use crate::executors::{self, ScheduledAction};
use crate::gacha::{self, GachaError};
use crate::npc::{nearest_npc, NpcKind};
use crate::player::Player;
use crate::quests::{QuestBook, QuestError};
use crate::scheduler::Scheduler;
use crate::skills::{FruitId, SkillCooldowns, SkillSlot};

/// One simulation step at 60 Hz.
pub const FRAME: Duration = Duration::from_nanos(16_666_667);
pub const WORLD_SIZE: Vec2 = Vec2::new(900.0, 900.0);
const RESPAWN_CLEAR_RADIUS: f32 = 200.0;
const MAX_NOTIFICATIONS: usize = 6;
const BOSS_SHOCKWAVE_FRAMES: u32 = 30;

pub const GOLD: Color = Color::rgb(1.0, 0.84, 0.0);
pub const BLOOD: Color = Color::rgb(0.55, 0.0, 0.0);
pub const ALERT: Color = Color::rgb(1.0, 0.2, 0.2);
pub const GREEN: Color = Color::rgb(0.2, 1.0, 0.2);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkillUseError {
    #[error("no fruit equipped")]
    NoFruitEquipped,
    #[error("{fruit:?} has no skill in slot {slot:?}")]
    SkillNotFound { fruit: FruitId, slot: SkillSlot },
    #[error("{name} is on cooldown for another {remaining:?}")]
    OnCooldown { name: &'static str, remaining: Duration },
}

/// Player intent for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub movement: Vec2,
    pub attack: bool,
    pub dash: bool,
    pub skills: [bool; 3],
}

/// A user-facing message for events worth announcing.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub color: Color,
    pub at: Duration,
}

#[derive(Resource)]
pub struct Simulation {
    pub now: Duration,
    pub frame: u64,
    pub bounds: Vec2,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub boss: BossState,
    pub effects: Effects,
    pub quests: QuestBook,
    pub cooldowns: SkillCooldowns,
    pub scheduler: Scheduler<ScheduledAction>,
    pub spawner: EnemySpawner,
    pub notifications: Vec<Notification>,
    pub rng: StdRng,
    save_requested: bool,
    next_enemy_id: u64,
    next_generation: u64,
}

impl Default for Simulation {
    fn default() -> Self { Self::new() }
}

impl Simulation {
    pub fn new() -> Self { Self::with_rng(StdRng::from_entropy()) }

    pub fn with_seed(seed: u64) -> Self { Self::with_rng(StdRng::seed_from_u64(seed)) }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            now: Duration::ZERO,
            frame: 0,
            bounds: WORLD_SIZE,
            player: Player::new(),
            enemies: Vec::new(),
            boss: BossState::default(),
            effects: Effects::default(),
            quests: QuestBook::default(),
            cooldowns: SkillCooldowns::default(),
            scheduler: Scheduler::default(),
            spawner: EnemySpawner::default(),
            notifications: Vec::new(),
            rng,
            save_requested: false,
            next_enemy_id: 0,
            next_generation: 0,
        }
    }

    /// Advances the world by one [`FRAME`].
    pub fn step(&mut self, input: &FrameInput) {
        self.now += FRAME;
        self.frame += 1;

        self.run_scheduled();
        self.cooldowns.poll(self.now);

        if !self.player.dead {
            if input.dash {
                self.dash();
            }
            if input.attack {
                self.attack();
            }
        }
        self.player.advance(input.movement, self.now, self.bounds);
        self.player.expire_swing(self.now);

        if !self.player.dead {
            for slot in SkillSlot::ALL {
                if input.skills[slot.index()] {
                    if let Err(error) = self.use_skill(slot) {
                        warn!("skill {:?} rejected: {error}", slot);
                    }
                }
            }
        }

        if self.spawner.due(self.now) {
            self.spawn_enemy_at_edge();
        }
        let target = self.player.position;
        for enemy in self.enemies.iter_mut() {
            enemy.chase(target);
        }
        self.update_boss();

        combat::resolve_frame(self);
        self.effects.update_visuals();
    }

    fn run_scheduled(&mut self) {
        while let Some(action) = self.scheduler.pop_due(self.now) {
            executors::run_scheduled(self, action);
        }
    }

    pub fn schedule_in(&mut self, delay: Duration, action: ScheduledAction) { self.scheduler.schedule(self.now + delay, action); }

    pub fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    pub fn spawn_enemy(&mut self, position: Vec2) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        self.enemies.push(Enemy::new(id, position));
        if self.enemies.len() > MAX_ENEMIES {
            self.enemies.remove(0);
        }
        id
    }

    fn spawn_enemy_at_edge(&mut self) -> EnemyId {
        let position = edge_spawn_position(&mut self.rng, self.bounds);
        self.spawn_enemy(position)
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> { self.enemies.iter().find(|enemy| enemy.id == id) }
    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> { self.enemies.iter_mut().find(|enemy| enemy.id == id) }

    pub fn target_position(&self, target: TargetRef) -> Option<Vec2> {
        match target {
            TargetRef::Enemy(id) => self.enemy(id).map(|enemy| enemy.position),
            TargetRef::Boss => self.boss.entity().map(|boss| boss.position),
        }
    }

    pub fn spawn_boss(&mut self) -> bool {
        let spawned = self.boss.spawn();
        if spawned {
            info!("raid boss spawned in the arena");
            self.notify("RAID BOSS APPEARS!", ALERT);
            self.shake(10.0, 800);
        }
        spawned
    }

    fn update_boss(&mut self) {
        if self.boss.try_respawn(self.now) {
            info!("raid boss respawned");
            self.notify("RAID BOSS APPEARS!", ALERT);
            self.shake(10.0, 800);
        }
        let Some(attack) = self.boss.update(self.player.position, self.now) else { return };
        self.effects.aoes.push(ExpandingAoe::cosmetic(attack.center, BOSS_ATTACK_RADIUS, BLOOD, BOSS_SHOCKWAVE_FRAMES));
        if attack.hits_player && !self.player.dead {
            let position = self.player.position;
            self.effects.damage_number(position + Vec2::Y * 30.0, BOSS_ATTACK_DAMAGE / self.player.defense());
            self.effects.text(position + Vec2::Y * 50.0, "BOSS ATTACK!", ALERT);
            self.shake(5.0, 300);
            self.damage_player(BOSS_ATTACK_DAMAGE);
        }
    }

    /// Routes damage to the player and handles the transition to death.
    pub fn damage_player(&mut self, amount: f32) {
        if self.player.take_damage(amount) {
            info!("player died at level {}", self.player.level);
            self.notify("YOU DIED! Press R to respawn", ALERT);
            self.request_save();
        }
    }

    pub fn dash(&mut self) -> bool { self.player.try_dash(self.now) }

    pub fn attack(&mut self) -> bool { self.player.start_swing(self.now) }

    /// Fires the skill in `slot` of the equipped fruit, then starts that slot's cooldown.
    pub fn use_skill(&mut self, slot: SkillSlot) -> Result<(), SkillUseError> {
        let fruit = self.player.fruit.ok_or(SkillUseError::NoFruitEquipped)?;
        let skill = *fruit.fruit().skill(slot).ok_or(SkillUseError::SkillNotFound { fruit, slot })?;
        let cooldown = self.cooldowns.slot(slot);
        if !cooldown.is_ready() {
            return Err(SkillUseError::OnCooldown { name: skill.name, remaining: cooldown.remaining(self.now) });
        }
        let damage = self.player.attack + skill.damage;
        executors::executor_for(fruit, slot)(self, damage);
        self.cooldowns.slot_mut(slot).trigger(self.now, skill.cooldown());
        Ok(())
    }

    pub fn draw_gacha(&mut self) -> Result<FruitId, GachaError> {
        match gacha::draw(&mut self.player, &mut self.rng) {
            Ok(fruit) => {
                let data = fruit.fruit();
                info!("gacha rolled {} ({})", data.name, data.rarity.label());
                self.notify(format!("You got {} ({})!", data.name, data.rarity.label()), data.rarity.color());
                self.request_save();
                Ok(fruit)
            }
            Err(error) => {
                self.notify(format!("Not enough coins! Need {}", gacha::GACHA_COST), ALERT);
                Err(error)
            }
        }
    }

    pub fn accept_quest(&mut self, id: &str) -> Result<(), QuestError> {
        let quest = self.quests.accept(id)?;
        info!("quest accepted: {}", quest.name);
        self.effects.text(self.player.position + Vec2::Y * 50.0, format!("Quest Accepted: {}", quest.name), GOLD);
        self.request_save();
        Ok(())
    }

    pub fn claim_quest(&mut self, id: &str) -> Result<(), QuestError> {
        let reward = self.quests.claim(id)?;
        info!("quest {id} completed: {} coins, {} exp", reward.coins, reward.exp);
        self.player.coins += reward.coins;
        self.player.exp += reward.exp;
        self.notify(format!("+{} Gold! +{} EXP!", reward.coins, reward.exp), GOLD);
        self.check_level_up();
        self.request_save();
        Ok(())
    }

    pub fn check_level_up(&mut self) {
        if self.player.check_level_up() {
            info!("level up to {}", self.player.level);
            self.notify(format!("LEVEL UP! Level {}", self.player.level), GOLD);
        }
    }

    pub fn interact(&self) -> Option<NpcKind> { nearest_npc(self.player.position).map(|npc| npc.kind) }

    /// Revives the player at the spawn point and clears nearby enemies.
    pub fn respawn(&mut self) -> bool {
        if !self.player.dead {
            return false;
        }
        self.player.respawn();
        let spawn = self.player.position;
        self.enemies.retain(|enemy| enemy.position.distance(spawn) >= RESPAWN_CLEAR_RADIUS);
        info!("player respawned");
        self.request_save();
        true
    }

    /// Drops all progress and world state, as on a first launch. The random stream carries on.
    pub fn reset_progress(&mut self) {
        let rng = std::mem::replace(&mut self.rng, StdRng::seed_from_u64(0));
        *self = Self::with_rng(rng);
        info!("progress reset");
        self.notify("Progress reset", ALERT);
    }

    pub fn notify(&mut self, text: impl Into<String>, color: Color) {
        self.notifications.push(Notification { text: text.into(), color, at: self.now });
        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    pub fn shake(&mut self, intensity: f32, millis: u64) { self.effects.shake.trigger(self.now, intensity, Duration::from_millis(millis)); }

    pub fn request_save(&mut self) { self.save_requested = true; }

    /// Returns whether a save was requested since the last call, and clears the flag.
    pub fn take_save_request(&mut self) -> bool { std::mem::take(&mut self.save_requested) }
}
