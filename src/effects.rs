//! Short-lived effect entities spawned by skills and combat events.
//!
//! Purely visual effects advance themselves in [`Effects::update_visuals`]. The damage-bearing
//! ones (projectiles, AOEs, pulling fields, venom pools) only carry state here; they are
//! resolved against actors in `combat`.

use bevy::math::Vec2;
use bevy::prelude::Color;
use rand::Rng;
use std::collections::HashSet;
use std::f32::consts::{PI, TAU};
use std::time::Duration;

use crate::components::{Lifetime, TargetRef};

pub const DAMAGE_NUMBER_FRAMES: u32 = 60;
const DAMAGE_NUMBER_RISE: f32 = 1.5;
pub const TEXT_POPUP_FRAMES: u32 = 60;
const TEXT_POPUP_RISE: f32 = 2.0;
const PARTICLE_DRAG: f32 = 0.98;

pub const PROJECTILE_SPEED: f32 = 8.0;
pub const PROJECTILE_RADIUS: f32 = 10.0;
pub const PROJECTILE_FRAMES: u32 = 120;

pub const PULL_RADIUS: f32 = 100.0;
pub const PULL_STRENGTH: f32 = 5.0;
pub const PULL_INNER_RADIUS: f32 = 20.0;
pub const PULL_FRAMES: u32 = 120;

pub const VENOM_POOL_RADIUS: f32 = 80.0;
pub const VENOM_POOL_FRAMES: u32 = 180;
pub const VENOM_POPUP_INTERVAL: u32 = 30;

const SCREEN_CRACK_FRAMES: u32 = 60;
const SCREEN_CRACK_COUNT: usize = 8;
const LIGHTNING_BOLT_FRAMES: u32 = 15;

#[derive(Debug, Clone)]
pub struct DamageNumber {
    pub position: Vec2,
    pub amount: f32,
    pub life: Lifetime,
}

#[derive(Debug, Clone)]
pub struct TextPopup {
    pub position: Vec2,
    pub text: String,
    pub color: Color,
    pub life: Lifetime,
}

impl TextPopup {
    /// Grows from 1.0 to 1.5 over its life.
    pub fn scale(&self) -> f32 { 1.0 + (1.0 - self.life.alpha()) * 0.5 }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub size: f32,
    pub life: Lifetime,
}

#[derive(Debug, Clone)]
pub struct SkillProjectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub color: Color,
    pub life: Lifetime,
}

impl SkillProjectile {
    pub fn toward(from: Vec2, target: Vec2, damage: f32, color: Color) -> Self {
        let mut heading = (target - from).normalize_or_zero();
        if heading == Vec2::ZERO {
            heading = Vec2::X;
        }
        Self { position: from, velocity: heading * PROJECTILE_SPEED, damage, color, life: Lifetime::frames(PROJECTILE_FRAMES) }
    }
}

#[derive(Debug, Clone)]
pub struct ExpandingAoe {
    pub center: Vec2,
    pub max_radius: f32,
    pub damage: f32,
    pub color: Color,
    pub label: &'static str,
    pub life: Lifetime,
    pub hit_set: HashSet<TargetRef>,
}

impl ExpandingAoe {
    pub fn new(center: Vec2, max_radius: f32, damage: f32, color: Color, frames: u32, label: &'static str) -> Self {
        Self { center, max_radius, damage, color, label, life: Lifetime::frames(frames), hit_set: HashSet::new() }
    }

    /// Visual-only shockwave; never damages anything.
    pub fn cosmetic(center: Vec2, max_radius: f32, color: Color, frames: u32) -> Self { Self::new(center, max_radius, 0.0, color, frames, "") }

    pub fn radius(&self) -> f32 {
        if self.life.total == 0 { self.max_radius } else { self.life.age() as f32 / self.life.total as f32 * self.max_radius }
    }

    pub fn deals_damage(&self) -> bool { self.damage > 0.0 }
}

#[derive(Debug, Clone)]
pub struct PullingField {
    pub center: Vec2,
    pub damage: f32,
    pub life: Lifetime,
    pub hit_set: HashSet<TargetRef>,
}

impl PullingField {
    pub fn new(center: Vec2, damage: f32) -> Self { Self { center, damage, life: Lifetime::frames(PULL_FRAMES), hit_set: HashSet::new() } }
}

#[derive(Debug, Clone)]
pub struct VenomPool {
    pub center: Vec2,
    pub damage_per_frame: f32,
    pub life: Lifetime,
}

impl VenomPool {
    pub fn new(center: Vec2, total_damage: f32) -> Self {
        Self { center, damage_per_frame: total_damage / VENOM_POOL_FRAMES as f32, life: Lifetime::frames(VENOM_POOL_FRAMES) }
    }

    /// True on the frames where accumulated damage is shown as one popup.
    pub fn popup_due(&self) -> bool { self.life.age() > 0 && self.life.age() % VENOM_POPUP_INTERVAL == 0 }

    pub fn popup_amount(&self) -> f32 { (self.damage_per_frame * VENOM_POPUP_INTERVAL as f32).floor() }
}

#[derive(Debug, Clone)]
pub struct CrackBranch {
    pub start_ratio: f32,
    pub angle: f32,
    pub length: f32,
}

#[derive(Debug, Clone)]
pub struct Crack {
    pub angle: f32,
    pub length: f32,
    pub branches: Vec<CrackBranch>,
}

/// Full-screen crack overlay, drawn in screen space around the view centre.
#[derive(Debug, Clone)]
pub struct ScreenCrack {
    pub cracks: Vec<Crack>,
    pub life: Lifetime,
}

impl ScreenCrack {
    pub fn generate(rng: &mut impl Rng) -> Self {
        let cracks = (0..SCREEN_CRACK_COUNT)
            .map(|i| {
                let angle = TAU / SCREEN_CRACK_COUNT as f32 * i as f32 + rng.gen_range(-0.25..0.25);
                let length = rng.gen_range(100.0..300.0);
                let branches = (0..rng.gen_range(1..=3))
                    .map(|_| CrackBranch {
                        start_ratio: rng.gen_range(0.3..0.7),
                        angle: angle + rng.gen_range(-PI / 4.0..PI / 4.0),
                        length: length * rng.gen_range(0.3..0.7),
                    })
                    .collect();
                Crack { angle, length, branches }
            })
            .collect();
        Self { cracks, life: Lifetime::frames(SCREEN_CRACK_FRAMES) }
    }
}

#[derive(Debug, Clone)]
pub struct LightningBolt {
    pub from: Vec2,
    pub to: Vec2,
    pub life: Lifetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenShake {
    pub intensity: f32,
    pub until: Duration,
}

impl ScreenShake {
    pub fn is_active(&self, now: Duration) -> bool { now < self.until && self.intensity > 0.0 }

    /// Keeps whichever shake is stronger, and the later expiry.
    pub fn trigger(&mut self, now: Duration, intensity: f32, duration: Duration) {
        let until = now + duration;
        if !self.is_active(now) {
            *self = ScreenShake { intensity, until };
        } else {
            self.intensity = self.intensity.max(intensity);
            self.until = self.until.max(until);
        }
    }
}

/// Every live transient effect, one collection per variant.
#[derive(Debug, Default)]
pub struct Effects {
    pub damage_numbers: Vec<DamageNumber>,
    pub texts: Vec<TextPopup>,
    pub particles: Vec<Particle>,
    pub projectiles: Vec<SkillProjectile>,
    pub aoes: Vec<ExpandingAoe>,
    pub pulling_fields: Vec<PullingField>,
    pub venom_pools: Vec<VenomPool>,
    pub screen_cracks: Vec<ScreenCrack>,
    pub bolts: Vec<LightningBolt>,
    pub shake: ScreenShake,
}

impl Effects {
    pub fn damage_number(&mut self, position: Vec2, amount: f32) {
        self.damage_numbers.push(DamageNumber { position, amount, life: Lifetime::frames(DAMAGE_NUMBER_FRAMES) });
    }

    pub fn text(&mut self, position: Vec2, text: impl Into<String>, color: Color) {
        self.texts.push(TextPopup { position, text: text.into(), color, life: Lifetime::frames(TEXT_POPUP_FRAMES) });
    }

    /// Radial burst of `count` particles with random speed up to `spread`.
    pub fn burst(&mut self, rng: &mut impl Rng, position: Vec2, count: usize, color: Color, spread: f32) {
        for _ in 0..count {
            let angle = rng.gen_range(0.0..TAU);
            let speed = rng.gen_range(0.0..=spread);
            self.particles.push(Particle {
                position,
                velocity: Vec2::from_angle(angle) * speed,
                color,
                size: rng.gen_range(2.0..5.0),
                life: Lifetime::frames(rng.gen_range(30..60)),
            });
        }
    }

    pub fn particle(&mut self, position: Vec2, velocity: Vec2, color: Color, size: f32, frames: u32) {
        self.particles.push(Particle { position, velocity, color, size, life: Lifetime::frames(frames) });
    }

    pub fn bolt(&mut self, from: Vec2, to: Vec2) { self.bolts.push(LightningBolt { from, to, life: Lifetime::frames(LIGHTNING_BOLT_FRAMES) }); }

    pub fn screen_crack(&mut self, rng: &mut impl Rng) { self.screen_cracks.push(ScreenCrack::generate(rng)); }

    /// Advances and expires the effects that do not interact with actors.
    pub fn update_visuals(&mut self) {
        self.damage_numbers.retain_mut(|number| {
            number.position.y += DAMAGE_NUMBER_RISE;
            number.life.tick()
        });
        self.texts.retain_mut(|popup| {
            popup.position.y += TEXT_POPUP_RISE;
            popup.life.tick()
        });
        self.particles.retain_mut(|particle| {
            particle.position += particle.velocity;
            particle.velocity *= PARTICLE_DRAG;
            particle.life.tick()
        });
        self.screen_cracks.retain_mut(|crack| crack.life.tick());
        self.bolts.retain_mut(|bolt| bolt.life.tick());
    }
}
