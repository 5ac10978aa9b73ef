//! Draws the simulation: gizmo shapes for actors and effects, `Text2d` for popups and labels.

use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::boss::{ARENA_CENTER, ARENA_RADIUS};
use crate::camera_systems::{world_to_render, MainCamera};
use crate::effects::{PULL_RADIUS, VENOM_POOL_RADIUS};
use crate::npc::NPCS;
use crate::player::BASIC_ATTACK_HALF_ARC;
use crate::simulation::{Simulation, WORLD_SIZE};

const WORLD_TEXT_Z: f32 = 10.0;
const PLAYER_COLOR: Color = Color::rgb(0.3, 0.6, 1.0);
const ENEMY_COLOR: Color = Color::rgb(1.0, 0.27, 0.27);
const FROZEN_COLOR: Color = Color::rgb(0.6, 0.9, 1.0);
const BOSS_COLOR: Color = Color::rgb(0.55, 0.0, 0.0);
const FIELD_COLOR: Color = Color::rgb(0.3, 0.3, 0.35);
const DAMAGE_TEXT_COLOR: Color = Color::rgb(1.0, 0.8, 0.8);

pub struct VisualEffectsPlugin;

impl Plugin for VisualEffectsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::rgb(0.1, 0.12, 0.1)))
            .add_systems(Update, (draw_world, draw_effects, sync_world_text));
    }
}

/// Every `Text2d` rebuilt from simulation state each frame carries this.
#[derive(Component)]
pub struct WorldText;

fn point(position: Vec2) -> Vec2 { world_to_render(position) }

fn health_bar(gizmos: &mut Gizmos, center: Vec2, width: f32, fraction: f32) {
    let left = center - Vec2::new(width / 2.0, 0.0);
    gizmos.line_2d(left, left + Vec2::new(width, 0.0), Color::DARK_GRAY);
    gizmos.line_2d(left, left + Vec2::new(width * fraction.clamp(0.0, 1.0), 0.0), Color::GREEN);
}

fn draw_world(mut gizmos: Gizmos, sim: Res<Simulation>) {
    gizmos.rect_2d(Vec2::ZERO, 0.0, WORLD_SIZE, FIELD_COLOR);
    let arena_color = if sim.boss.player_in_arena { Color::ORANGE_RED } else { Color::rgba(0.8, 0.2, 0.2, 0.5) };
    gizmos.circle_2d(point(ARENA_CENTER), ARENA_RADIUS, arena_color);

    for npc in NPCS.iter() {
        gizmos.circle_2d(point(npc.position), npc.size / 2.0, npc.color);
        gizmos.circle_2d(point(npc.position), npc.interaction_radius, npc.color.with_a(0.15));
    }

    for enemy in &sim.enemies {
        let color = if enemy.is_frozen() { FROZEN_COLOR } else { ENEMY_COLOR };
        let at = point(enemy.position);
        gizmos.rect_2d(at, 0.0, Vec2::splat(enemy.size), color);
        health_bar(&mut gizmos, at + Vec2::Y * (enemy.size / 2.0 + 6.0), enemy.size, enemy.health.fraction());
    }

    if let Some(boss) = sim.boss.entity() {
        let at = point(boss.position);
        gizmos.circle_2d(at, boss.size / 2.0, BOSS_COLOR);
        gizmos.circle_2d(at, boss.size / 2.0 + 4.0, Color::ORANGE_RED);
        health_bar(&mut gizmos, at + Vec2::Y * (boss.size / 2.0 + 12.0), boss.size * 2.0, boss.health.fraction());
    }

    let player = &sim.player;
    let at = point(player.position);
    let color = if player.dead { Color::GRAY } else if player.transform.is_some() { Color::GOLD } else { PLAYER_COLOR };
    gizmos.rect_2d(at, 0.0, Vec2::splat(player.size()), color);
    gizmos.line_2d(at, at + player.facing * player.size(), Color::WHITE);
    if let Some(fruit) = player.fruit {
        gizmos.circle_2d(at, player.size() * 0.75, fruit.fruit().color.with_a(0.6));
    }
    if player.swing.is_some() {
        let range = player.attack_range();
        let facing = player.facing.y.atan2(player.facing.x);
        let steps = 8;
        let arc: Vec<Vec2> = (0..=steps)
            .map(|i| facing - BASIC_ATTACK_HALF_ARC + 2.0 * BASIC_ATTACK_HALF_ARC * i as f32 / steps as f32)
            .map(|angle| at + Vec2::from_angle(angle) * range)
            .collect();
        gizmos.linestrip_2d(std::iter::once(at).chain(arc).chain(std::iter::once(at)), Color::WHITE);
    }
}

fn draw_effects(mut gizmos: Gizmos, sim: Res<Simulation>, camera: Query<&Transform, With<MainCamera>>) {
    let effects = &sim.effects;
    for particle in &effects.particles {
        gizmos.circle_2d(point(particle.position), particle.size, particle.color.with_a(particle.life.alpha()));
    }
    for projectile in &effects.projectiles {
        gizmos.circle_2d(point(projectile.position), crate::effects::PROJECTILE_RADIUS, projectile.color);
    }
    for aoe in &effects.aoes {
        gizmos.circle_2d(point(aoe.center), aoe.radius().max(1.0), aoe.color.with_a(aoe.life.alpha().max(0.2)));
    }
    for field in &effects.pulling_fields {
        let at = point(field.center);
        let spin = field.life.age() as f32 * 0.2;
        gizmos.circle_2d(at, PULL_RADIUS, Color::rgba(0.29, 0.0, 0.51, 0.5));
        for arm in 0..4 {
            let angle = spin + TAU / 4.0 * arm as f32;
            gizmos.line_2d(at, at + Vec2::from_angle(angle) * PULL_RADIUS * 0.8, Color::PURPLE);
        }
    }
    for pool in &effects.venom_pools {
        gizmos.circle_2d(point(pool.center), VENOM_POOL_RADIUS, Color::rgba(0.58, 0.0, 0.83, pool.life.alpha().max(0.3)));
    }
    for bolt in &effects.bolts {
        gizmos.line_2d(point(bolt.from), point(bolt.to), Color::YELLOW.with_a(bolt.life.alpha()));
    }

    let Ok(camera) = camera.get_single() else { return };
    let center = camera.translation.truncate();
    for screen_crack in &effects.screen_cracks {
        let color = Color::WHITE.with_a(screen_crack.life.alpha());
        for crack in &screen_crack.cracks {
            let end = center + Vec2::from_angle(crack.angle) * crack.length;
            gizmos.line_2d(center, end, color);
            for branch in &crack.branches {
                let start = center + Vec2::from_angle(crack.angle) * crack.length * branch.start_ratio;
                gizmos.line_2d(start, start + Vec2::from_angle(branch.angle) * branch.length, color);
            }
        }
    }
}

fn spawn_world_text(commands: &mut Commands, text: String, position: Vec2, size: f32, color: Color) {
    commands.spawn((
        Text2dBundle {
            text: Text::from_section(text, TextStyle { font_size: size, color, ..default() }),
            transform: Transform::from_translation(point(position).extend(WORLD_TEXT_Z)),
            ..default()
        },
        WorldText,
    ));
}

/// Rebuilds popups and name labels from the simulation.
fn sync_world_text(mut commands: Commands, sim: Res<Simulation>, existing: Query<Entity, With<WorldText>>) {
    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }
    for number in &sim.effects.damage_numbers {
        let color = DAMAGE_TEXT_COLOR.with_a(number.life.alpha());
        spawn_world_text(&mut commands, format!("{}", number.amount.round() as i64), number.position, 18.0, color);
    }
    for popup in &sim.effects.texts {
        spawn_world_text(&mut commands, popup.text.clone(), popup.position, 20.0 * popup.scale(), popup.color.with_a(popup.life.alpha()));
    }
    for npc in NPCS.iter() {
        spawn_world_text(&mut commands, npc.name.to_string(), npc.position + Vec2::Y * (npc.size / 2.0 + 14.0), 16.0, Color::WHITE);
    }
    if let Some(boss) = sim.boss.entity() {
        spawn_world_text(&mut commands, "RAID BOSS".to_string(), boss.position + Vec2::Y * (boss.size / 2.0 + 26.0), 18.0, Color::ORANGE_RED);
    }
}
