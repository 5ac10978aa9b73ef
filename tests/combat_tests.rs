use bevy::math::Vec2;
use devil_fruit_arena::boss::{BOSS_HEALTH, BOSS_RESPAWN_DELAY};
use devil_fruit_arena::combat::{damage_boss, damage_enemy, grant_kill_reward, Hit, ENEMY_KILL_REWARD};
use devil_fruit_arena::player::Player;
use devil_fruit_arena::quests::{QuestEvent, QuestSink};
use devil_fruit_arena::simulation::{FrameInput, Simulation};
use std::time::Duration;

#[derive(Default)]
struct RecordingSink(Vec<(QuestEvent, u32)>);

impl QuestSink for RecordingSink {
    fn record(&mut self, event: QuestEvent, amount: u32) -> Vec<&'static str> {
        self.0.push((event, amount));
        Vec::new()
    }
}

#[test]
fn test_two_hits_kill_and_reward_once() {
    let mut sim = Simulation::with_seed(7);
    let id = sim.spawn_enemy(Vec2::new(100.0, 800.0));
    assert_eq!(damage_enemy(&mut sim, id, 20.0), Hit::Damaged);
    assert_eq!(sim.enemy(id).map(|e| e.health.current()), Some(10.0));
    assert_eq!(damage_enemy(&mut sim, id, 20.0), Hit::Killed);
    assert_eq!(damage_enemy(&mut sim, id, 20.0), Hit::Missed);
    assert!(sim.enemy(id).is_none());
    assert_eq!(sim.player.exp, 5);
    assert_eq!(sim.player.coins, 52);
    assert_eq!(sim.player.kills, 1);
}

#[test]
fn test_kill_reward_reports_to_quest_sink() {
    let mut player = Player::new();
    let mut sink = RecordingSink::default();
    grant_kill_reward(&mut player, &mut sink, &ENEMY_KILL_REWARD);
    assert_eq!(sink.0, vec![(QuestEvent::EnemyKill, 1)]);
    assert_eq!(player.exp, 5);
}

#[test]
fn test_kills_level_the_player_up() {
    let mut sim = Simulation::with_seed(8);
    for _ in 0..2 {
        let id = sim.spawn_enemy(Vec2::new(100.0, 800.0));
        damage_enemy(&mut sim, id, 100.0);
    }
    assert_eq!(sim.player.level, 2);
    assert_eq!(sim.player.exp, 0);
    assert_eq!(sim.player.exp_needed, 15);
    assert_eq!(sim.player.attack, 15.0);
    assert!(sim.notifications.iter().any(|n| n.text.starts_with("LEVEL UP!")));
}

#[test]
fn test_contact_damage_trickles_every_frame() {
    let mut sim = Simulation::with_seed(9);
    sim.spawn_enemy(sim.player.position + Vec2::new(10.0, 0.0));
    sim.step(&FrameInput::default());
    assert_eq!(sim.player.health.current(), 99.5);
    sim.step(&FrameInput::default());
    assert_eq!(sim.player.health.current(), 99.0);
}

#[test]
fn test_dashing_ignores_contact_damage() {
    let mut sim = Simulation::with_seed(10);
    sim.spawn_enemy(sim.player.position + Vec2::new(0.0, 10.0));
    sim.step(&FrameInput { dash: true, ..Default::default() });
    assert_eq!(sim.player.health.current(), 100.0);
}

#[test]
fn test_player_dies_once_and_respawns() {
    let mut sim = Simulation::with_seed(11);
    sim.damage_player(150.0);
    sim.damage_player(150.0);
    assert!(sim.player.dead);
    assert_eq!(sim.notifications.iter().filter(|n| n.text.starts_with("YOU DIED")).count(), 1);
    sim.spawn_enemy(sim.player.position + Vec2::new(100.0, 0.0));
    sim.spawn_enemy(Vec2::new(850.0, 850.0));
    assert!(sim.respawn());
    assert_eq!(sim.enemies.len(), 1);
    assert_eq!(sim.player.health.current(), 100.0);
    assert!(!sim.respawn());
}

#[test]
fn test_boss_respawns_after_delay() {
    let mut sim = Simulation::with_seed(12);
    assert!(sim.spawn_boss());
    assert_eq!(damage_boss(&mut sim, BOSS_HEALTH + 1.0), Hit::Killed);
    assert_eq!(sim.player.coins, 550);
    assert_eq!(sim.player.level, 2);
    assert_eq!(sim.player.exp, 0);
    assert_eq!(damage_boss(&mut sim, 10.0), Hit::Missed);

    sim.now += BOSS_RESPAWN_DELAY - Duration::from_millis(100);
    sim.step(&FrameInput::default());
    assert!(sim.boss.is_dead());
    sim.now += Duration::from_millis(100);
    sim.step(&FrameInput::default());
    assert_eq!(sim.boss.entity().map(|b| b.health.current()), Some(BOSS_HEALTH));
}
