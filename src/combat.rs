//! Damage routing and per-frame resolution of damage-bearing effects.
//!
//! Every source of damage ends up in [`damage_target`], so kill rewards, quest progress and
//! death handling happen in one place, synchronously, and at most once per actor.

use bevy::log::info;
use bevy::math::Vec2;
use bevy::prelude::Color;

use crate::boss::{BOSS_COIN_REWARD, BOSS_EXP_REWARD};
use crate::components::{EnemyId, TargetRef};
use crate::effects::{PULL_INNER_RADIUS, PULL_RADIUS, PULL_STRENGTH, VENOM_POOL_RADIUS};
use crate::enemy::ENEMY_CONTACT_DAMAGE;
use crate::geometry::{aabb_overlap, angle_between, segment_distance, within_radius};
use crate::player::{Player, BASIC_ATTACK_HALF_ARC};
use crate::quests::{QuestEvent, QuestSink};
use crate::simulation::{Simulation, ALERT, GOLD};

const HIT_BURST: usize = 15;
const ENEMY_DEATH_BURST: usize = 10;
const BOSS_DEATH_BURST: usize = 100;
const VENOM_PARTICLE_INTERVAL: u32 = 10;
const ENEMY_RED: Color = Color::rgb(1.0, 0.27, 0.27);
const VENOM_PURPLE: Color = Color::rgb(0.55, 0.0, 0.8);

/// What a kill pays out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillReward {
    pub coins: u32,
    pub exp: u32,
    pub kills: u32,
    pub event: QuestEvent,
}

pub const ENEMY_KILL_REWARD: KillReward = KillReward { coins: 2, exp: 5, kills: 1, event: QuestEvent::EnemyKill };
pub const BOSS_KILL_REWARD: KillReward = KillReward { coins: BOSS_COIN_REWARD, exp: BOSS_EXP_REWARD, kills: 0, event: QuestEvent::BossKill };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The target was already gone.
    Missed,
    Damaged,
    Killed,
}

/// Credits a kill to the player and reports it to the quest log.
/// Returns the quests that reached their target with this kill.
pub fn grant_kill_reward<S: QuestSink + ?Sized>(player: &mut Player, quests: &mut S, reward: &KillReward) -> Vec<&'static str> {
    player.exp += reward.exp;
    player.coins += reward.coins;
    player.kills += reward.kills;
    quests.record(reward.event, 1)
}

fn settle_kill(sim: &mut Simulation, reward: &KillReward) {
    let reached = grant_kill_reward(&mut sim.player, &mut sim.quests, reward);
    for id in reached {
        info!("quest {id} reached its target");
        sim.notify("Quest Complete! Return to NPC", GOLD);
    }
    sim.check_level_up();
    sim.request_save();
}

/// Applies `amount` to one target without a popup.
pub fn damage_target(sim: &mut Simulation, target: TargetRef, amount: f32) -> Hit {
    match target {
        TargetRef::Enemy(id) => damage_enemy(sim, id, amount),
        TargetRef::Boss => damage_boss(sim, amount),
    }
}

/// Applies `amount` and shows it as a floating number above the target.
pub fn strike(sim: &mut Simulation, target: TargetRef, amount: f32) -> Hit {
    let Some(position) = sim.target_position(target) else { return Hit::Missed };
    sim.effects.damage_number(position + Vec2::Y * 20.0, amount);
    damage_target(sim, target, amount)
}

/// Looks the enemy up by id; an enemy that already died is a no-op.
pub fn damage_enemy(sim: &mut Simulation, id: EnemyId, amount: f32) -> Hit {
    let Some(index) = sim.enemies.iter().position(|enemy| enemy.id == id) else { return Hit::Missed };
    sim.enemies[index].health.damage(amount);
    if !sim.enemies[index].health.is_depleted() {
        return Hit::Damaged;
    }
    let enemy = sim.enemies.remove(index);
    sim.effects.burst(&mut sim.rng, enemy.position, ENEMY_DEATH_BURST, ENEMY_RED, 3.0);
    settle_kill(sim, &ENEMY_KILL_REWARD);
    Hit::Killed
}

pub fn damage_boss(sim: &mut Simulation, amount: f32) -> Hit {
    let Some(boss) = sim.boss.entity_mut() else { return Hit::Missed };
    boss.health.damage(amount);
    if !boss.health.is_depleted() {
        return Hit::Damaged;
    }
    let Some(position) = sim.boss.kill(sim.now) else { return Hit::Missed };
    info!("raid boss defeated");
    sim.effects.burst(&mut sim.rng, position, BOSS_DEATH_BURST, GOLD, 8.0);
    sim.effects.text(position + Vec2::Y * 60.0, "BOSS DEFEATED!", GOLD);
    sim.notify(format!("BOSS DEFEATED! +{} Gold +{} EXP", BOSS_COIN_REWARD, BOSS_EXP_REWARD), GOLD);
    sim.shake(15.0, 1000);
    settle_kill(sim, &BOSS_KILL_REWARD);
    Hit::Killed
}

/// Every live target with its position and collision size.
pub fn targets(sim: &Simulation) -> Vec<(TargetRef, Vec2, f32)> {
    let mut all: Vec<_> = sim.enemies.iter().map(|enemy| (TargetRef::Enemy(enemy.id), enemy.position, enemy.size)).collect();
    if let Some(boss) = sim.boss.entity() {
        all.push((TargetRef::Boss, boss.position, boss.size));
    }
    all
}

/// Up to `count` targets ordered by distance from `from`.
pub fn nearest_targets(sim: &Simulation, from: Vec2, count: usize) -> Vec<(TargetRef, Vec2)> {
    let mut all: Vec<_> = targets(sim).into_iter().map(|(target, position, _)| (target, position)).collect();
    all.sort_by(|a, b| a.1.distance(from).total_cmp(&b.1.distance(from)));
    all.truncate(count);
    all
}

pub fn nearest_target(sim: &Simulation, from: Vec2) -> Option<(TargetRef, Vec2)> { nearest_targets(sim, from, 1).into_iter().next() }

/// Hits everything within `radius` of `center` right now.
pub fn strike_area(sim: &mut Simulation, center: Vec2, radius: f32, amount: f32) -> Vec<TargetRef> {
    let hit: Vec<_> = targets(sim).into_iter().filter(|(_, position, _)| within_radius(*position, center, radius)).map(|(target, ..)| target).collect();
    for target in &hit {
        strike(sim, *target, amount);
    }
    hit
}

pub fn resolve_frame(sim: &mut Simulation) {
    resolve_basic_attack(sim);
    resolve_projectiles(sim);
    resolve_aoes(sim);
    resolve_pulling_fields(sim);
    resolve_venom_pools(sim);
    resolve_contact(sim);
}

/// The swing arc hits anything in range and within the half-arc of the facing direction.
fn resolve_basic_attack(sim: &mut Simulation) {
    let Some(swing) = sim.player.swing.as_ref() else { return };
    let origin = sim.player.position;
    let facing = sim.player.facing;
    let range = sim.player.attack_range();
    let hits: Vec<_> = targets(sim)
        .into_iter()
        .filter(|(target, ..)| !swing.hit_set.contains(target))
        .filter(|(target, position, size)| {
            let reach = if *target == TargetRef::Boss { range + size / 2.0 } else { range };
            within_radius(*position, origin, reach) && angle_between(facing, *position - origin) <= BASIC_ATTACK_HALF_ARC
        })
        .map(|(target, ..)| target)
        .collect();
    if let Some(swing) = sim.player.swing.as_mut() {
        swing.hit_set.extend(hits.iter().copied());
    }
    let damage = sim.player.attack;
    for target in hits {
        strike(sim, target, damage);
    }
}

fn resolve_projectiles(sim: &mut Simulation) {
    let mut kept = Vec::new();
    for mut projectile in std::mem::take(&mut sim.effects.projectiles) {
        let previous = projectile.position;
        projectile.position += projectile.velocity;
        let alive = projectile.life.tick();
        let enemy_hit = sim
            .enemies
            .iter()
            .find(|enemy| segment_distance(enemy.position, previous, projectile.position) < enemy.size)
            .map(|enemy| TargetRef::Enemy(enemy.id));
        let hit = enemy_hit.or_else(|| {
            sim.boss.entity().filter(|boss| segment_distance(boss.position, previous, projectile.position) < boss.size).map(|_| TargetRef::Boss)
        });
        match hit {
            Some(target) => {
                sim.effects.burst(&mut sim.rng, projectile.position, HIT_BURST, projectile.color, 4.0);
                strike(sim, target, projectile.damage);
            }
            None if alive => kept.push(projectile),
            None => {}
        }
    }
    kept.append(&mut sim.effects.projectiles);
    sim.effects.projectiles = kept;
}

fn resolve_aoes(sim: &mut Simulation) {
    let mut kept = Vec::new();
    for mut aoe in std::mem::take(&mut sim.effects.aoes) {
        let alive = aoe.life.tick();
        if aoe.deals_damage() {
            let radius = aoe.radius();
            let fresh: Vec<_> = targets(sim)
                .into_iter()
                .filter(|(target, position, _)| !aoe.hit_set.contains(target) && within_radius(*position, aoe.center, radius))
                .collect();
            for (target, position, _) in fresh {
                aoe.hit_set.insert(target);
                if !aoe.label.is_empty() {
                    sim.effects.text(position + Vec2::Y * 30.0, aoe.label, aoe.color);
                }
                strike(sim, target, aoe.damage);
            }
        }
        if alive {
            kept.push(aoe);
        }
    }
    kept.append(&mut sim.effects.aoes);
    sim.effects.aoes = kept;
}

/// Drags enemies toward the centre; each one reaching the core is struck once.
fn resolve_pulling_fields(sim: &mut Simulation) {
    let mut kept = Vec::new();
    for mut field in std::mem::take(&mut sim.effects.pulling_fields) {
        let alive = field.life.tick();
        let mut collapsed = Vec::new();
        for enemy in sim.enemies.iter_mut() {
            let distance = enemy.position.distance(field.center);
            if distance >= PULL_RADIUS {
                continue;
            }
            enemy.position += (field.center - enemy.position).normalize_or_zero() * PULL_STRENGTH.min(distance);
            let target = TargetRef::Enemy(enemy.id);
            if distance < PULL_INNER_RADIUS && field.hit_set.insert(target) {
                collapsed.push(target);
            }
        }
        for target in collapsed {
            strike(sim, target, field.damage);
        }
        if alive {
            kept.push(field);
        }
    }
    kept.append(&mut sim.effects.pulling_fields);
    sim.effects.pulling_fields = kept;
}

/// Continuous damage to everything inside a pool; numbers are shown in aggregate.
fn resolve_venom_pools(sim: &mut Simulation) {
    let mut kept = Vec::new();
    for mut pool in std::mem::take(&mut sim.effects.venom_pools) {
        let alive = pool.life.tick();
        let inside: Vec<_> = targets(sim)
            .into_iter()
            .filter(|(_, position, _)| within_radius(*position, pool.center, VENOM_POOL_RADIUS))
            .collect();
        for (target, position, _) in inside {
            if pool.popup_due() {
                sim.effects.damage_number(position + Vec2::Y * 20.0, pool.popup_amount());
            }
            if pool.life.age() % VENOM_PARTICLE_INTERVAL == 0 {
                sim.effects.burst(&mut sim.rng, position, 3, VENOM_PURPLE, 1.0);
            }
            damage_target(sim, target, pool.damage_per_frame);
        }
        if alive {
            kept.push(pool);
        }
    }
    kept.append(&mut sim.effects.venom_pools);
    sim.effects.venom_pools = kept;
}

/// Each overlapping enemy trickles damage into the player every frame.
fn resolve_contact(sim: &mut Simulation) {
    if sim.player.dead || sim.player.is_dashing() {
        return;
    }
    let (position, size) = (sim.player.position, sim.player.size());
    let touching = sim.enemies.iter().filter(|enemy| aabb_overlap(position, size, enemy.position, enemy.size)).count();
    for _ in 0..touching {
        sim.damage_player(ENEMY_CONTACT_DAMAGE);
    }
    if touching > 0 && sim.player.dead {
        sim.effects.text(position + Vec2::Y * 40.0, "DEFEATED", ALERT);
    }
}
