use bevy::math::Vec2;
use devil_fruit_arena::components::Health;
use devil_fruit_arena::simulation::{FrameInput, Simulation, SkillUseError};
use devil_fruit_arena::skills::{FruitId, SkillSlot};
use std::time::Duration;

fn with_fruit(fruit: FruitId) -> Simulation {
    let mut sim = Simulation::with_seed(42);
    sim.player.fruit = Some(fruit);
    sim.player.recompute_stats();
    sim
}

fn step_until(sim: &mut Simulation, at: Duration) {
    while sim.now < at {
        sim.step(&FrameInput::default());
    }
}

#[test]
fn test_skill_without_fruit_is_rejected() {
    let mut sim = Simulation::with_seed(1);
    assert_eq!(sim.use_skill(SkillSlot::Z), Err(SkillUseError::NoFruitEquipped));
}

#[test]
fn test_skill_on_cooldown_is_a_no_op() {
    let mut sim = with_fruit(FruitId::Flame);
    assert!(sim.use_skill(SkillSlot::Z).is_ok());
    let projectiles = sim.effects.projectiles.len();
    assert!(matches!(sim.use_skill(SkillSlot::Z), Err(SkillUseError::OnCooldown { name: "Fire Fist", .. })));
    assert_eq!(sim.effects.projectiles.len(), projectiles);
    assert!(sim.use_skill(SkillSlot::X).is_ok());

    step_until(&mut sim, Duration::from_millis(3950));
    assert!(sim.use_skill(SkillSlot::Z).is_err());
    step_until(&mut sim, Duration::from_millis(4000));
    assert!(sim.use_skill(SkillSlot::Z).is_ok());
}

#[test]
fn test_flame_wave_kills_adjacent_enemy_once() {
    let mut sim = with_fruit(FruitId::Flame);
    let id = sim.spawn_enemy(sim.player.position + Vec2::new(50.0, 0.0));
    assert!(sim.use_skill(SkillSlot::X).is_ok());
    step_until(&mut sim, Duration::from_millis(700));
    assert!(sim.enemy(id).is_none());
    assert_eq!(sim.player.kills, 1);
    assert_eq!(sim.player.exp, 5);
}

#[test]
fn test_refreeze_restores_base_speed() {
    let mut sim = with_fruit(FruitId::Ice);
    let id = sim.spawn_enemy(sim.player.position + Vec2::new(50.0, 0.0));
    if let Some(enemy) = sim.enemy_mut(id) {
        enemy.health = Health::new(1000.0);
    }
    assert!(sim.use_skill(SkillSlot::X).is_ok());
    step_until(&mut sim, Duration::from_secs(1));
    assert!(sim.use_skill(SkillSlot::C).is_ok());

    step_until(&mut sim, Duration::from_millis(3100));
    assert_eq!(sim.enemy(id).map(|e| e.speed), Some(0.0));
    step_until(&mut sim, Duration::from_millis(6100));
    assert_eq!(sim.enemy(id).map(|e| e.speed), Some(1.5));
    assert!(sim.enemy(id).is_some_and(|e| !e.is_frozen()));
}

#[test]
fn test_venom_pool_drains_its_full_damage() {
    let mut sim = with_fruit(FruitId::Venom);
    let id = sim.spawn_enemy(sim.player.position + Vec2::new(40.0, 0.0));
    if let Some(enemy) = sim.enemy_mut(id) {
        enemy.health = Health::new(1000.0);
        enemy.speed = 0.0;
    }
    assert!(sim.use_skill(SkillSlot::X).is_ok());
    step_until(&mut sim, Duration::from_secs(4));
    let damage = 10.0 + 10.0 + 42.0;
    let health = sim.enemy(id).map(|e| e.health.current()).unwrap_or_default();
    assert!((1000.0 - health - damage).abs() < 0.01, "took {}", 1000.0 - health);
}

#[test]
fn test_gacha_draw_keeps_running_cooldowns() {
    let mut sim = with_fruit(FruitId::Quake);
    assert!(sim.use_skill(SkillSlot::C).is_ok());
    assert!(sim.draw_gacha().is_ok());
    assert!(!sim.cooldowns.slot(SkillSlot::C).is_ready());
    assert!(sim.cooldowns.slot(SkillSlot::Z).is_ready());
    assert!(matches!(sim.use_skill(SkillSlot::C), Err(SkillUseError::OnCooldown { .. })));

    step_until(&mut sim, Duration::from_millis(18_000));
    assert!(sim.cooldowns.slot(SkillSlot::C).is_ready());
}
