//! One executor per fruit and slot, plus the deferred actions they schedule.

use bevy::log::debug;
use bevy::math::Vec2;
use bevy::prelude::Color;
use rand::Rng;
use std::f32::consts::{PI, TAU};
use std::time::Duration;

use crate::combat::{self, nearest_target, nearest_targets};
use crate::components::{EnemyId, TargetRef};
use crate::effects::{ExpandingAoe, PullingField, SkillProjectile, VenomPool};
use crate::player::{TransformBuff, TRANSFORM_DURATION};
use crate::simulation::Simulation;
use crate::skills::{FruitId, SkillSlot};

pub type SkillExecutor = fn(&mut Simulation, f32);

const ICE_SHARD_STAGGER: Duration = Duration::from_millis(100);
const LIGHT_STRIKES: u32 = 8;
const LIGHT_STRIKE_STAGGER: Duration = Duration::from_millis(150);
const LIGHT_STRIKE_SPREAD: f32 = 100.0;
const METEORS: u32 = 6;
const METEOR_STAGGER: Duration = Duration::from_millis(250);
const METEOR_FALL: Duration = Duration::from_millis(200);
const METEOR_SPREAD: f32 = 125.0;
const CHAIN_HOPS: u32 = 5;
const CHAIN_RANGE: f32 = 200.0;
const CHAIN_STAGGER: Duration = Duration::from_millis(100);
const BUDDHA_EMPOWER: f32 = 1.5;

/// Work deferred to a later frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledAction {
    /// Fires from wherever the player stands at fire time. Falls back to the nearest target.
    FireProjectile { target: Option<TargetRef>, damage: f32, color: Color },
    LightStrike { damage: f32 },
    MeteorMarker { damage: f32 },
    MeteorImpact { position: Vec2, damage: f32 },
    ChainHop { from: Vec2, visited: Vec<TargetRef>, remaining: u32, damage: f32 },
    /// Particle burst at an offset from the player's position at fire time.
    PlayerBurst { offset: Vec2, count: usize, color: Color, spread: f32 },
    Unfreeze { enemy: EnemyId, generation: u64 },
    EndTransform { generation: u64 },
}

pub fn run_scheduled(sim: &mut Simulation, action: ScheduledAction) {
    match action {
        ScheduledAction::FireProjectile { target, damage, color } => {
            let origin = sim.player.position;
            let aim = target.and_then(|t| sim.target_position(t)).or_else(|| nearest_target(sim, origin).map(|(_, p)| p));
            let aim = aim.unwrap_or(origin + sim.player.facing);
            sim.effects.projectiles.push(SkillProjectile::toward(origin, aim, damage, color));
        }
        ScheduledAction::LightStrike { damage } => {
            let center = sim.player.position + random_offset(sim, LIGHT_STRIKE_SPREAD);
            sim.effects.aoes.push(ExpandingAoe::new(center, 40.0, damage, FruitId::Light.fruit().color, 20, "DIVINE!"));
            sim.effects.burst(&mut sim.rng, center, 10, Color::rgb(1.0, 1.0, 0.6), 5.0);
        }
        ScheduledAction::MeteorMarker { damage } => {
            let position = sim.player.position + random_offset(sim, METEOR_SPREAD);
            sim.effects.burst(&mut sim.rng, position, 8, Color::rgb(1.0, 0.27, 0.0), 2.0);
            sim.schedule_in(METEOR_FALL, ScheduledAction::MeteorImpact { position, damage });
        }
        ScheduledAction::MeteorImpact { position, damage } => {
            sim.effects.aoes.push(ExpandingAoe::new(position, 50.0, damage, Color::rgb(1.0, 0.27, 0.0), 25, "METEOR!"));
            sim.effects.burst(&mut sim.rng, position, 20, Color::rgb(1.0, 0.55, 0.0), 6.0);
            sim.shake(3.0, 150);
        }
        ScheduledAction::ChainHop { from, visited, remaining, damage } => chain_hop(sim, from, visited, remaining, damage),
        ScheduledAction::PlayerBurst { offset, count, color, spread } => {
            let position = sim.player.position + offset;
            sim.effects.burst(&mut sim.rng, position, count, color, spread);
        }
        ScheduledAction::Unfreeze { enemy, generation } => {
            if let Some(enemy) = sim.enemy_mut(enemy) {
                enemy.thaw(generation);
            }
        }
        ScheduledAction::EndTransform { generation } => {
            if sim.player.transform.is_some_and(|buff| buff.generation == generation) {
                sim.player.transform = None;
                let position = sim.player.position;
                cast_text(sim, "BUDDHA FORM END", FruitId::Buddha.fruit().color);
                sim.effects.burst(&mut sim.rng, position, 30, FruitId::Buddha.fruit().color, 8.0);
            }
        }
    }
}

pub fn executor_for(fruit: FruitId, slot: SkillSlot) -> SkillExecutor {
    use FruitId::*;
    use SkillSlot::*;
    match (fruit, slot) {
        (Flame, Z) => flame_z,
        (Flame, X) => flame_x,
        (Flame, C) => flame_c,
        (Ice, Z) => ice_z,
        (Ice, X) => ice_x,
        (Ice, C) => ice_c,
        (Light, Z) => light_z,
        (Light, X) => light_x,
        (Light, C) => light_c,
        (Dark, Z) => dark_z,
        (Dark, X) => dark_x,
        (Dark, C) => dark_c,
        (Wind, Z) => wind_z,
        (Wind, X) => wind_x,
        (Wind, C) => wind_c,
        (Magma, Z) => magma_z,
        (Magma, X) => magma_x,
        (Magma, C) => magma_c,
        (Quake, Z) => quake_z,
        (Quake, X) => quake_x,
        (Quake, C) => quake_c,
        (Buddha, Z) => buddha_z,
        (Buddha, X) => buddha_x,
        (Buddha, C) => buddha_c,
        (Electric, Z) => electric_z,
        (Electric, X) => electric_x,
        (Electric, C) => electric_c,
        (Venom, Z) => venom_z,
        (Venom, X) => venom_x,
        (Venom, C) => venom_c,
    }
}

fn random_offset(sim: &mut Simulation, spread: f32) -> Vec2 {
    Vec2::new(sim.rng.gen_range(-spread..=spread), sim.rng.gen_range(-spread..=spread))
}

fn random_point_in_circle(sim: &mut Simulation, radius: f32) -> Vec2 {
    Vec2::from_angle(sim.rng.gen_range(0.0..TAU)) * sim.rng.gen_range(0.0..radius)
}

fn cast_text(sim: &mut Simulation, text: &str, color: Color) {
    let position = sim.player.position + Vec2::Y * 50.0;
    sim.effects.text(position, text, color);
}

fn aoe(sim: &mut Simulation, radius: f32, damage: f32, color: Color, frames: u32, label: &'static str) {
    let center = sim.player.position;
    sim.effects.aoes.push(ExpandingAoe::new(center, radius, damage, color, frames, label));
}

fn projectile_at_nearest(sim: &mut Simulation, damage: f32, color: Color) {
    let target = nearest_target(sim, sim.player.position).map(|(target, _)| target);
    run_scheduled(sim, ScheduledAction::FireProjectile { target, damage, color });
}

/// Pushes enemies within `radius` straight away from the player.
fn knockback(sim: &mut Simulation, radius: f32, distance: f32) {
    let origin = sim.player.position;
    for enemy in sim.enemies.iter_mut() {
        let offset = enemy.position - origin;
        let length = offset.length();
        if length > 0.0 && length < radius {
            enemy.position += offset / length * distance;
        }
    }
}

/// Freezes enemies within `radius` and schedules each thaw under this cast's generation.
fn freeze_around(sim: &mut Simulation, radius: f32, duration: Duration) {
    let generation = sim.next_generation();
    let (origin, now) = (sim.player.position, sim.now);
    let thaws: Vec<_> = sim
        .enemies
        .iter_mut()
        .filter(|enemy| enemy.position.distance(origin) < radius)
        .map(|enemy| (enemy.id, enemy.freeze(now, duration, generation)))
        .collect();
    for (enemy, until) in thaws {
        sim.scheduler.schedule(until, ScheduledAction::Unfreeze { enemy, generation });
        if let Some(position) = sim.target_position(TargetRef::Enemy(enemy)) {
            sim.effects.burst(&mut sim.rng, position, 8, Color::rgb(0.0, 0.75, 1.0), 2.0);
        }
    }
}

fn instant_zap(sim: &mut Simulation, damage: f32, label: &str) {
    let origin = sim.player.position;
    let Some((target, position)) = nearest_target(sim, origin) else { return };
    sim.effects.bolt(origin, position);
    sim.effects.text(position + Vec2::Y * 40.0, label, Color::rgb(1.0, 1.0, 0.0));
    sim.effects.burst(&mut sim.rng, position, 12, Color::rgb(1.0, 1.0, 0.0), 5.0);
    combat::strike(sim, target, damage);
}

fn staggered_bursts(sim: &mut Simulation, count: u32, interval_ms: u64, radius: f32, color: Color) {
    for i in 0..count {
        let offset = random_point_in_circle(sim, radius);
        sim.schedule_in(Duration::from_millis(interval_ms * i as u64), ScheduledAction::PlayerBurst { offset, count: 5, color, spread: 6.0 });
    }
}

fn chain_hop(sim: &mut Simulation, from: Vec2, mut visited: Vec<TargetRef>, remaining: u32, damage: f32) {
    let next = combat::targets(sim)
        .into_iter()
        .filter(|(target, position, _)| !visited.contains(target) && position.distance(from) < CHAIN_RANGE)
        .min_by(|a, b| a.1.distance(from).total_cmp(&b.1.distance(from)));
    let Some((target, position, _)) = next else {
        debug!("chain lightning fizzled with {remaining} hops left");
        return;
    };
    sim.effects.bolt(from, position);
    sim.effects.text(position + Vec2::Y * 40.0, "ZAP!", Color::rgb(1.0, 1.0, 0.0));
    combat::strike(sim, target, damage);
    visited.push(target);
    if remaining > 1 {
        sim.schedule_in(CHAIN_STAGGER, ScheduledAction::ChainHop { from: position, visited, remaining: remaining - 1, damage });
    }
}

fn flame_z(sim: &mut Simulation, damage: f32) {
    projectile_at_nearest(sim, damage, Color::rgb(1.0, 0.27, 0.0));
    cast_text(sim, "FIRE FIST!", Color::rgb(1.0, 0.27, 0.0));
    sim.shake(2.0, 150);
}

fn flame_x(sim: &mut Simulation, damage: f32) {
    aoe(sim, 120.0, damage, Color::rgb(1.0, 0.27, 0.0), 40, "BURN!");
    cast_text(sim, "FLAME WAVE!", Color::rgb(1.0, 0.27, 0.0));
    sim.shake(4.0, 250);
}

fn flame_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 180.0, damage, Color::rgb(1.0, 0.0, 0.0), 50, "INFERNO!!");
    let position = sim.player.position;
    sim.effects.burst(&mut sim.rng, position, 50, Color::rgb(1.0, 0.55, 0.0), 10.0);
    cast_text(sim, "INFERNO BLAST!", Color::rgb(1.0, 0.0, 0.0));
    sim.shake(8.0, 500);
}

fn ice_z(sim: &mut Simulation, damage: f32) {
    let targets = nearest_targets(sim, sim.player.position, 3);
    let color = Color::rgb(0.0, 0.75, 1.0);
    for shard in 0..3 {
        let target = targets.get(shard).or_else(|| targets.first()).map(|(target, _)| *target);
        let action = ScheduledAction::FireProjectile { target, damage, color };
        if shard == 0 {
            run_scheduled(sim, action);
        } else {
            sim.schedule_in(ICE_SHARD_STAGGER * shard as u32, action);
        }
    }
    cast_text(sim, "ICE SHARD!", color);
}

fn ice_x(sim: &mut Simulation, damage: f32) {
    aoe(sim, 150.0, damage, Color::rgb(0.0, 0.75, 1.0), 45, "FREEZE!");
    freeze_around(sim, 150.0, Duration::from_millis(3000));
    cast_text(sim, "GLACIAL BURST!", Color::rgb(0.0, 0.75, 1.0));
    sim.shake(5.0, 300);
}

fn ice_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 200.0, damage, Color::rgb(0.0, 1.0, 1.0), 60, "FROZEN!!");
    freeze_around(sim, 200.0, Duration::from_millis(5000));
    cast_text(sim, "FROZEN DOMAIN!", Color::rgb(0.0, 1.0, 1.0));
    sim.shake(8.0, 500);
}

fn light_z(sim: &mut Simulation, damage: f32) {
    instant_zap(sim, damage, "ZAP!");
    cast_text(sim, "LIGHT BEAM!", Color::rgb(1.0, 1.0, 0.0));
}

fn light_x(sim: &mut Simulation, damage: f32) {
    for strike in 0..LIGHT_STRIKES {
        sim.schedule_in(LIGHT_STRIKE_STAGGER * strike, ScheduledAction::LightStrike { damage: damage * 0.6 });
    }
    cast_text(sim, "SACRED RAIN!", Color::rgb(1.0, 1.0, 0.0));
}

fn light_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 250.0, damage, Color::rgb(1.0, 1.0, 0.0), 45, "JUDGMENT!!");
    let position = sim.player.position;
    sim.effects.burst(&mut sim.rng, position, 60, Color::WHITE, 12.0);
    cast_text(sim, "DIVINE JUDGMENT!", Color::rgb(1.0, 1.0, 0.0));
    sim.shake(10.0, 600);
}

fn dark_z(sim: &mut Simulation, damage: f32) {
    aoe(sim, 100.0, damage, Color::rgb(0.29, 0.0, 0.51), 35, "DARK!");
    cast_text(sim, "SHADOW PULSE!", Color::rgb(0.55, 0.0, 1.0));
}

fn dark_x(sim: &mut Simulation, damage: f32) {
    let center = sim.player.position;
    sim.effects.pulling_fields.push(PullingField::new(center, damage));
    cast_text(sim, "BLACK HOLE!", Color::rgb(0.29, 0.0, 0.51));
    sim.shake(4.0, 400);
}

fn dark_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 220.0, damage, Color::BLACK, 55, "VOID!!");
    cast_text(sim, "VOID COLLAPSE!", Color::rgb(0.55, 0.0, 1.0));
    sim.shake(9.0, 600);
}

fn wind_z(sim: &mut Simulation, damage: f32) {
    aoe(sim, 90.0, damage, Color::rgb(0.56, 0.93, 0.56), 30, "SLASH!");
    knockback(sim, 90.0, 40.0);
    cast_text(sim, "WIND SLASH!", Color::rgb(0.56, 0.93, 0.56));
}

fn wind_x(sim: &mut Simulation, damage: f32) {
    let color = Color::rgb(0.56, 0.93, 0.56);
    aoe(sim, 140.0, damage, color, 40, "TORNADO!");
    for i in 0..60u32 {
        let progress = i as f32 / 60.0;
        let offset = Vec2::from_angle(progress * 2.0 * TAU) * (70.0 + progress * 70.0);
        sim.schedule_in(Duration::from_millis(10 * i as u64), ScheduledAction::PlayerBurst { offset, count: 3, color, spread: 4.0 });
    }
    knockback(sim, 140.0, 80.0);
    cast_text(sim, "TORNADO SPIN!", color);
    sim.shake(5.0, 300);
}

fn wind_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 200.0, damage, Color::rgb(0.56, 0.93, 0.56), 50, "HURRICANE!!");
    staggered_bursts(sim, 100, 8, 200.0, Color::rgb(0.6, 0.98, 0.6));
    knockback(sim, 200.0, 120.0);
    cast_text(sim, "HURRICANE FURY!", Color::rgb(0.56, 0.93, 0.56));
    sim.shake(8.0, 500);
}

fn magma_z(sim: &mut Simulation, damage: f32) {
    projectile_at_nearest(sim, damage, Color::rgb(0.55, 0.0, 0.0));
    cast_text(sim, "LAVA FIST!", Color::rgb(0.55, 0.0, 0.0));
    sim.shake(3.0, 200);
}

fn magma_x(sim: &mut Simulation, damage: f32) {
    for meteor in 0..METEORS {
        sim.schedule_in(METEOR_STAGGER * meteor, ScheduledAction::MeteorMarker { damage: damage * 0.7 });
    }
    cast_text(sim, "METEOR SHOWER!", Color::rgb(1.0, 0.27, 0.0));
}

fn magma_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 190.0, damage, Color::rgb(0.55, 0.0, 0.0), 55, "ERUPTION!!");
    let origin = sim.player.position;
    for _ in 0..80 {
        let angle = PI / 2.0 + sim.rng.gen_range(-PI / 2.0..PI / 2.0);
        let speed = sim.rng.gen_range(5.0..15.0);
        let size = sim.rng.gen_range(3.0..6.0);
        sim.effects.particle(origin, Vec2::from_angle(angle) * speed, Color::rgb(1.0, 0.27, 0.0), size, 50);
    }
    cast_text(sim, "VOLCANIC ERUPTION!", Color::rgb(0.55, 0.0, 0.0));
    sim.shake(10.0, 600);
}

fn quake_z(sim: &mut Simulation, damage: f32) {
    aoe(sim, 110.0, damage, Color::WHITE, 35, "QUAKE!");
    cast_text(sim, "TREMOR PUNCH!", Color::WHITE);
    sim.shake(6.0, 300);
}

fn quake_x(sim: &mut Simulation, damage: f32) {
    aoe(sim, 170.0, damage, Color::rgb(0.68, 0.85, 0.9), 45, "EARTHQUAKE!!");
    cast_text(sim, "EARTHQUAKE!", Color::rgb(0.68, 0.85, 0.9));
    sim.shake(12.0, 700);
}

fn quake_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 250.0, damage, Color::WHITE, 60, "CATACLYSM!!");
    sim.effects.screen_crack(&mut sim.rng);
    let position = sim.player.position;
    sim.effects.burst(&mut sim.rng, position, 90, Color::rgb(0.68, 0.85, 0.9), 25.0);
    cast_text(sim, "CATACLYSM!!", Color::WHITE);
    sim.shake(20.0, 1000);
}

fn buddha_z(sim: &mut Simulation, damage: f32) {
    aoe(sim, 100.0, damage, Color::rgb(1.0, 0.84, 0.0), 35, "PALM!");
    cast_text(sim, "PALM STRIKE!", Color::rgb(1.0, 0.84, 0.0));
    sim.shake(4.0, 200);
}

/// Enters Buddha form; while it runs, re-use only reports the time left.
fn buddha_x(sim: &mut Simulation, _damage: f32) {
    let gold = Color::rgb(1.0, 0.84, 0.0);
    if let Some(buff) = sim.player.transform {
        let left = buff.until.saturating_sub(sim.now);
        let seconds = left.as_millis().div_ceil(1000);
        cast_text(sim, &format!("ACTIVE: {seconds}s"), gold);
        return;
    }
    let generation = sim.next_generation();
    let until = sim.now + TRANSFORM_DURATION;
    sim.player.transform = Some(TransformBuff { until, generation });
    sim.scheduler.schedule(until, ScheduledAction::EndTransform { generation });
    let origin = sim.player.position;
    for i in 0..60 {
        sim.effects.particle(origin, Vec2::from_angle(TAU / 60.0 * i as f32) * 6.0, gold, 4.0, 40);
    }
    cast_text(sim, "BUDDHA FORM!", gold);
    sim.shake(5.0, 500);
}

fn buddha_c(sim: &mut Simulation, damage: f32) {
    let damage = if sim.player.transform.is_some() { damage * BUDDHA_EMPOWER } else { damage };
    aoe(sim, 180.0, damage, Color::rgb(1.0, 0.84, 0.0), 50, "DIVINE!!");
    cast_text(sim, "DIVINE IMPACT!", Color::rgb(1.0, 0.84, 0.0));
    sim.shake(9.0, 600);
}

fn electric_z(sim: &mut Simulation, damage: f32) {
    instant_zap(sim, damage, "ZAP!");
    cast_text(sim, "THUNDER STRIKE!", Color::rgb(1.0, 1.0, 0.0));
    sim.shake(3.0, 150);
}

fn electric_x(sim: &mut Simulation, damage: f32) {
    let from = sim.player.position;
    chain_hop(sim, from, Vec::new(), CHAIN_HOPS, damage);
    cast_text(sim, "CHAIN LIGHTNING!", Color::rgb(1.0, 1.0, 0.0));
}

fn electric_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 210.0, damage, Color::rgb(1.0, 1.0, 0.0), 55, "THUNDER!!");
    staggered_bursts(sim, 80, 10, 210.0, Color::rgb(1.0, 0.67, 0.0));
    cast_text(sim, "THUNDER GOD!", Color::rgb(1.0, 1.0, 0.0));
    sim.shake(11.0, 600);
}

fn venom_z(sim: &mut Simulation, damage: f32) {
    projectile_at_nearest(sim, damage, Color::rgb(0.58, 0.0, 0.83));
    cast_text(sim, "POISON!", Color::rgb(0.58, 0.0, 0.83));
    sim.shake(2.0, 150);
}

fn venom_x(sim: &mut Simulation, damage: f32) {
    let center = sim.player.position;
    sim.effects.venom_pools.push(VenomPool::new(center, damage));
    sim.effects.burst(&mut sim.rng, center, 40, Color::rgb(0.55, 0.0, 0.55), 10.0);
    cast_text(sim, "VENOM POOL!", Color::rgb(0.58, 0.0, 0.83));
    sim.shake(5.0, 300);
}

fn venom_c(sim: &mut Simulation, damage: f32) {
    aoe(sim, 195.0, damage, Color::rgb(0.58, 0.0, 0.83), 52, "HYDRA!!");
    cast_text(sim, "HYDRA!!", Color::rgb(0.58, 0.0, 0.83));
    sim.shake(9.0, 600);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::FrameInput;

    fn equipped(fruit: FruitId) -> Simulation {
        let mut sim = Simulation::with_seed(9);
        sim.player.fruit = Some(fruit);
        sim.player.recompute_stats();
        sim
    }

    #[test]
    fn every_fruit_slot_runs_without_targets() {
        for fruit in FruitId::ALL {
            for slot in SkillSlot::ALL {
                let mut sim = equipped(fruit);
                assert!(sim.use_skill(slot).is_ok(), "{fruit:?} {slot:?}");
                for _ in 0..120 {
                    sim.step(&FrameInput::default());
                }
            }
        }
    }

    #[test]
    fn buddha_form_ends_after_duration() {
        let mut sim = equipped(FruitId::Buddha);
        buddha_x(&mut sim, 0.0);
        assert_eq!(sim.player.size(), 60.0);
        assert_eq!(sim.player.defense(), 2.0);
        let generation = sim.player.transform.map(|b| b.generation);
        buddha_x(&mut sim, 0.0);
        assert_eq!(sim.player.transform.map(|b| b.generation), generation);
        for _ in 0..(15 * 60 + 2) {
            sim.step(&FrameInput::default());
        }
        assert!(sim.player.transform.is_none());
        assert_eq!(sim.player.size(), 30.0);
    }

    #[test]
    fn chain_lightning_visits_each_target_once() {
        let mut sim = equipped(FruitId::Electric);
        let origin = sim.player.position;
        let ids: Vec<_> = (0..3).map(|i| sim.spawn_enemy(origin + Vec2::new(60.0 * (i + 1) as f32, 0.0))).collect();
        chain_hop(&mut sim, origin, Vec::new(), CHAIN_HOPS, 10.0);
        for _ in 0..30 {
            run_pending(&mut sim);
        }
        for id in ids {
            assert_eq!(sim.enemy(id).map(|e| e.health.current()), Some(20.0));
        }
        assert_eq!(sim.effects.texts.iter().filter(|popup| popup.text == "ZAP!").count(), 3);
    }

    fn run_pending(sim: &mut Simulation) {
        sim.now += Duration::from_millis(20);
        while let Some(action) = sim.scheduler.pop_due(sim.now) {
            run_scheduled(sim, action);
        }
    }

    #[test]
    fn freeze_thaws_to_base_speed() {
        let mut sim = equipped(FruitId::Ice);
        let id = sim.spawn_enemy(sim.player.position + Vec2::new(50.0, 0.0));
        freeze_around(&mut sim, 150.0, Duration::from_millis(3000));
        sim.now += Duration::from_millis(1000);
        freeze_around(&mut sim, 200.0, Duration::from_millis(5000));
        assert_eq!(sim.enemy(id).map(|e| e.speed), Some(0.0));
        sim.now += Duration::from_millis(2500);
        while let Some(action) = sim.scheduler.pop_due(sim.now) {
            run_scheduled(&mut sim, action);
        }
        assert_eq!(sim.enemy(id).map(|e| e.speed), Some(0.0));
        sim.now += Duration::from_millis(2500);
        while let Some(action) = sim.scheduler.pop_due(sim.now) {
            run_scheduled(&mut sim, action);
        }
        assert_eq!(sim.enemy(id).map(|e| e.speed), Some(1.5));
    }
}
