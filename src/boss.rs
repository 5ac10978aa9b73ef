use bevy::math::Vec2;
use std::time::Duration;

use crate::components::Health;
use crate::geometry::{clamp_to_circle, within_radius};

pub const ARENA_CENTER: Vec2 = Vec2::new(700.0, 700.0);
pub const ARENA_RADIUS: f32 = 150.0;
pub const BOSS_SIZE: f32 = 60.0;
pub const BOSS_HEALTH: f32 = 10_000.0;
pub const BOSS_SPEED: f32 = 1.5;
const BOSS_ENGAGE_DISTANCE: f32 = 50.0;
pub const BOSS_ATTACK_COOLDOWN: Duration = Duration::from_millis(3000);
pub const BOSS_ATTACK_RADIUS: f32 = 100.0;
pub const BOSS_ATTACK_DAMAGE: f32 = 25.0;
pub const BOSS_RESPAWN_DELAY: Duration = Duration::from_secs(60);
pub const BOSS_COIN_REWARD: u32 = 500;
pub const BOSS_EXP_REWARD: u32 = 200;

#[derive(Debug, Clone)]
pub struct RaidBoss {
    pub position: Vec2,
    pub size: f32,
    pub speed: f32,
    pub health: Health,
    pub last_attack: Option<Duration>,
}

impl RaidBoss {
    fn new() -> Self {
        Self { position: ARENA_CENTER, size: BOSS_SIZE, speed: BOSS_SPEED, health: Health::new(BOSS_HEALTH), last_attack: None }
    }
}

#[derive(Debug, Clone)]
pub enum BossLifecycle {
    Inactive,
    Active(RaidBoss),
    Dead { respawn_at: Duration },
}

/// Outcome of the boss's periodic area attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossAttack {
    pub center: Vec2,
    pub hits_player: bool,
}

#[derive(Debug, Clone)]
pub struct BossState {
    pub lifecycle: BossLifecycle,
    pub player_in_arena: bool,
}

impl Default for BossState {
    fn default() -> Self { Self { lifecycle: BossLifecycle::Inactive, player_in_arena: false } }
}

impl BossState {
    pub fn is_active(&self) -> bool { matches!(self.lifecycle, BossLifecycle::Active(_)) }
    pub fn is_dead(&self) -> bool { matches!(self.lifecycle, BossLifecycle::Dead { .. }) }

    pub fn entity(&self) -> Option<&RaidBoss> {
        match &self.lifecycle {
            BossLifecycle::Active(boss) => Some(boss),
            _ => None,
        }
    }

    pub fn entity_mut(&mut self) -> Option<&mut RaidBoss> {
        match &mut self.lifecycle {
            BossLifecycle::Active(boss) => Some(boss),
            _ => None,
        }
    }

    pub fn respawn_at(&self) -> Option<Duration> {
        match self.lifecycle {
            BossLifecycle::Dead { respawn_at } => Some(respawn_at),
            _ => None,
        }
    }

    /// Brings the boss in from `Inactive`. A live or dead boss is left alone.
    pub fn spawn(&mut self) -> bool {
        if !matches!(self.lifecycle, BossLifecycle::Inactive) {
            return false;
        }
        self.lifecycle = BossLifecycle::Active(RaidBoss::new());
        true
    }

    pub fn try_respawn(&mut self, now: Duration) -> bool {
        match self.lifecycle {
            BossLifecycle::Dead { respawn_at } if now >= respawn_at => {
                self.lifecycle = BossLifecycle::Active(RaidBoss::new());
                true
            }
            _ => false,
        }
    }

    /// Moves `Active` to `Dead` and returns where the boss fell.
    pub fn kill(&mut self, now: Duration) -> Option<Vec2> {
        let position = self.entity()?.position;
        self.lifecycle = BossLifecycle::Dead { respawn_at: now + BOSS_RESPAWN_DELAY };
        Some(position)
    }

    /// One frame of arena tracking and boss AI.
    pub fn update(&mut self, player_position: Vec2, now: Duration) -> Option<BossAttack> {
        self.player_in_arena = within_radius(player_position, ARENA_CENTER, ARENA_RADIUS);
        if !self.player_in_arena {
            return None;
        }
        let boss = self.entity_mut()?;
        if boss.position.distance(player_position) > BOSS_ENGAGE_DISTANCE {
            boss.position += (player_position - boss.position).normalize_or_zero() * boss.speed;
        }
        boss.position = clamp_to_circle(boss.position, ARENA_CENTER, ARENA_RADIUS - boss.size);

        let ready = boss.last_attack.map_or(true, |last| now.saturating_sub(last) >= BOSS_ATTACK_COOLDOWN);
        if !ready {
            return None;
        }
        boss.last_attack = Some(now);
        Some(BossAttack { center: boss.position, hits_player: within_radius(player_position, boss.position, BOSS_ATTACK_RADIUS) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_cycles_through_death_and_respawn() {
        let mut state = BossState::default();
        assert!(state.spawn());
        assert!(!state.spawn());
        let now = Duration::from_secs(10);
        assert_eq!(state.kill(now), Some(ARENA_CENTER));
        assert!(!state.is_active());
        assert!(!state.spawn());
        assert!(!state.try_respawn(now + BOSS_RESPAWN_DELAY - Duration::from_millis(1)));
        assert!(state.try_respawn(now + BOSS_RESPAWN_DELAY));
        assert!(state.is_active());
        assert_eq!(state.entity().map(|b| b.health.current()), Some(BOSS_HEALTH));
    }

    #[test]
    fn boss_idles_while_player_is_outside() {
        let mut state = BossState::default();
        state.spawn();
        assert_eq!(state.update(Vec2::new(100.0, 100.0), Duration::ZERO), None);
        assert!(!state.player_in_arena);
        assert_eq!(state.entity().map(|b| b.position), Some(ARENA_CENTER));
    }

    #[test]
    fn boss_stays_inside_arena_and_attacks_on_cooldown() {
        let mut state = BossState::default();
        state.spawn();
        let player = ARENA_CENTER + Vec2::new(140.0, 0.0);
        let first = state.update(player, Duration::ZERO);
        assert_eq!(first.map(|a| a.hits_player), Some(false));
        for frame in 1..200u64 {
            let attack = state.update(player, Duration::from_millis(frame * 10));
            assert!(attack.is_none());
        }
        let boss = state.entity().map(|b| b.position).unwrap_or_default();
        assert!(boss.distance(ARENA_CENTER) <= ARENA_RADIUS - BOSS_SIZE + 1e-3);
        let next = state.update(player, Duration::from_millis(3000));
        assert_eq!(next.map(|a| a.hits_player), Some(true));
    }
}
