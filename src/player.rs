use bevy::math::Vec2;
use std::collections::HashSet;
use std::time::Duration;

use crate::components::{Health, TargetRef};
use crate::skills::FruitId;

pub const PLAYER_SIZE: f32 = 30.0;
pub const BASE_PLAYER_SPEED: f32 = 3.0;
pub const INITIAL_PLAYER_MAX_HEALTH: f32 = 100.0;
pub const BASE_ATTACK: f32 = 10.0;
pub const ATTACK_PER_LEVEL: f32 = 5.0;
pub const MAX_HEALTH_PER_LEVEL: f32 = 20.0;
pub const STARTING_COINS: u32 = 50;
pub const INITIAL_EXP_NEEDED: u32 = 10;
const EXP_CURVE_FACTOR: f32 = 1.5;
/// Highest level a save file may restore.
pub const MAX_LOADED_LEVEL: u32 = 500;
pub const SPAWN_POINT: Vec2 = Vec2::new(400.0, 400.0);

pub const DASH_SPEED: f32 = 12.0;
pub const DASH_DURATION: Duration = Duration::from_millis(150);
pub const DASH_COOLDOWN: Duration = Duration::from_millis(1000);

pub const BASIC_ATTACK_RANGE: f32 = 60.0;
pub const BASIC_ATTACK_HALF_ARC: f32 = std::f32::consts::FRAC_PI_3;
pub const BASIC_ATTACK_DURATION: Duration = Duration::from_millis(200);

pub const TRANSFORM_DURATION: Duration = Duration::from_secs(15);
const TRANSFORM_MULTIPLIER: f32 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashState {
    pub active: bool,
    pub started_at: Duration,
    pub ready_at: Duration,
}

/// One basic-attack swing; each target is struck at most once per swing.
#[derive(Debug, Clone)]
pub struct AttackSwing {
    pub started_at: Duration,
    pub hit_set: HashSet<TargetRef>,
}

/// Buddha form. `generation` ties the buff to the scheduled expiry that ends it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformBuff {
    pub until: Duration,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Vec2,
    pub speed: f32,
    pub health: Health,
    pub level: u32,
    pub exp: u32,
    pub exp_needed: u32,
    pub attack: f32,
    pub coins: u32,
    pub kills: u32,
    pub fruit: Option<FruitId>,
    pub dash: DashState,
    pub swing: Option<AttackSwing>,
    pub transform: Option<TransformBuff>,
    pub dead: bool,
}

impl Default for Player {
    fn default() -> Self { Self::new() }
}

/// Experience needed to leave `level`: 10, then x1.5 floored per level.
pub fn exp_needed_for_level(level: u32) -> u32 {
    (1..level.max(1)).fold(INITIAL_EXP_NEEDED, |needed, _| (needed as f32 * EXP_CURVE_FACTOR).floor() as u32)
}

impl Player {
    pub fn new() -> Self {
        Self {
            position: SPAWN_POINT,
            velocity: Vec2::ZERO,
            facing: Vec2::X,
            speed: BASE_PLAYER_SPEED,
            health: Health::new(INITIAL_PLAYER_MAX_HEALTH),
            level: 1,
            exp: 0,
            exp_needed: INITIAL_EXP_NEEDED,
            attack: BASE_ATTACK,
            coins: STARTING_COINS,
            kills: 0,
            fruit: None,
            dash: DashState::default(),
            swing: None,
            transform: None,
            dead: false,
        }
    }

    fn transform_factor(&self) -> f32 { if self.transform.is_some() { TRANSFORM_MULTIPLIER } else { 1.0 } }
    pub fn size(&self) -> f32 { PLAYER_SIZE * self.transform_factor() }
    pub fn attack_range(&self) -> f32 { BASIC_ATTACK_RANGE * self.transform_factor() }
    pub fn defense(&self) -> f32 { self.transform_factor() }
    pub fn is_dashing(&self) -> bool { self.dash.active }

    /// Attack and speed from level and the equipped fruit.
    pub fn recompute_stats(&mut self) {
        let (atk_bonus, speed_bonus) = self.fruit.map(|id| (id.fruit().atk_bonus, id.fruit().speed_bonus)).unwrap_or((0.0, 0.0));
        self.attack = BASE_ATTACK + (self.level.saturating_sub(1)) as f32 * ATTACK_PER_LEVEL + atk_bonus;
        self.speed = BASE_PLAYER_SPEED + speed_bonus;
    }

    /// Moves one frame: a running dash overrides the input vector.
    pub fn advance(&mut self, input: Vec2, now: Duration, bounds: Vec2) {
        if self.dead {
            self.velocity = Vec2::ZERO;
            return;
        }
        if self.dash.active && now.saturating_sub(self.dash.started_at) >= DASH_DURATION {
            self.dash.active = false;
        }
        let input = input.clamp_length_max(1.0);
        if input != Vec2::ZERO {
            self.facing = input.normalize_or_zero();
        }
        self.velocity = if self.dash.active { self.facing * DASH_SPEED } else { input * self.speed };
        let half = self.size() / 2.0;
        self.position = (self.position + self.velocity).clamp(Vec2::splat(half), bounds - Vec2::splat(half));
    }

    pub fn try_dash(&mut self, now: Duration) -> bool {
        if self.dead || self.dash.active || now < self.dash.ready_at {
            return false;
        }
        self.dash = DashState { active: true, started_at: now, ready_at: now + DASH_COOLDOWN };
        true
    }

    /// Applies incoming damage through defense. Returns true only on the hit that kills.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        self.health.damage(amount / self.defense());
        if self.health.is_depleted() {
            self.dead = true;
            self.swing = None;
            self.dash.active = false;
            return true;
        }
        false
    }

    /// Starts a swing unless one is already running.
    pub fn start_swing(&mut self, now: Duration) -> bool {
        if self.dead || self.swing.is_some() {
            return false;
        }
        self.swing = Some(AttackSwing { started_at: now, hit_set: HashSet::new() });
        true
    }

    pub fn expire_swing(&mut self, now: Duration) {
        if self.swing.as_ref().is_some_and(|swing| now.saturating_sub(swing.started_at) >= BASIC_ATTACK_DURATION) {
            self.swing = None;
        }
    }

    /// Gains at most one level per check; leftover experience is discarded.
    pub fn check_level_up(&mut self) -> bool {
        if self.exp < self.exp_needed {
            return false;
        }
        self.exp = 0;
        self.level += 1;
        self.exp_needed = (self.exp_needed as f32 * EXP_CURVE_FACTOR).floor() as u32;
        self.attack += ATTACK_PER_LEVEL;
        self.health.set_max(self.health.max() + MAX_HEALTH_PER_LEVEL);
        self.health.heal_full();
        true
    }

    pub fn respawn(&mut self) {
        self.health.heal_full();
        self.position = SPAWN_POINT;
        self.velocity = Vec2::ZERO;
        self.dead = false;
        self.dash = DashState::default();
        self.swing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(900.0, 900.0);

    #[test]
    fn level_curve_matches_progression() {
        assert_eq!(exp_needed_for_level(1), 10);
        assert_eq!(exp_needed_for_level(2), 15);
        assert_eq!(exp_needed_for_level(3), 22);
        assert_eq!(exp_needed_for_level(4), 33);
    }

    #[test]
    fn level_up_raises_stats_and_heals() {
        let mut player = Player::new();
        player.take_damage(40.0);
        player.exp = 12;
        assert!(player.check_level_up());
        assert_eq!(player.level, 2);
        assert_eq!(player.exp, 0);
        assert_eq!(player.exp_needed, 15);
        assert_eq!(player.attack, 15.0);
        assert_eq!(player.health.max(), 120.0);
        assert_eq!(player.health.current(), 120.0);
    }

    #[test]
    fn death_is_reported_once() {
        let mut player = Player::new();
        assert!(!player.take_damage(60.0));
        assert!(player.take_damage(60.0));
        assert!(!player.take_damage(60.0));
        assert_eq!(player.health.current(), 0.0);
        player.respawn();
        assert!(!player.dead);
        assert_eq!(player.health.current(), 100.0);
        assert_eq!(player.position, SPAWN_POINT);
    }

    #[test]
    fn dash_overrides_input_then_cools_down() {
        let mut player = Player::new();
        let start = player.position;
        assert!(player.try_dash(Duration::ZERO));
        player.advance(Vec2::ZERO, Duration::from_millis(16), BOUNDS);
        assert_eq!(player.position, start + Vec2::new(DASH_SPEED, 0.0));
        player.advance(Vec2::ZERO, Duration::from_millis(150), BOUNDS);
        assert!(!player.is_dashing());
        assert!(!player.try_dash(Duration::from_millis(999)));
        assert!(player.try_dash(Duration::from_millis(1000)));
    }

    #[test]
    fn movement_is_clamped_to_world() {
        let mut player = Player::new();
        player.position = Vec2::new(16.0, 400.0);
        player.advance(Vec2::new(-1.0, 0.0), Duration::ZERO, BOUNDS);
        assert_eq!(player.position.x, 15.0);
        assert_eq!(player.facing, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn fruit_bonuses_feed_derived_stats() {
        let mut player = Player::new();
        player.level = 3;
        player.fruit = Some(FruitId::Light);
        player.recompute_stats();
        assert_eq!(player.attack, 30.0);
        assert_eq!(player.speed, 5.0);
    }
}
