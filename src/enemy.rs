use bevy::math::Vec2;
use rand::Rng;
use std::time::Duration;

use crate::components::{EnemyId, Health};

pub const ENEMY_SIZE: f32 = 25.0;
pub const ENEMY_SPEED: f32 = 1.5;
pub const ENEMY_HEALTH: f32 = 30.0;
pub const ENEMY_CONTACT_DAMAGE: f32 = 0.5;
pub const ENEMY_SPAWN_INTERVAL: Duration = Duration::from_millis(2000);
pub const MAX_ENEMIES: usize = 15;
const SPAWN_EDGE_MARGIN: f32 = 30.0;

/// Pending freeze; `original_speed` is captured by the first freeze only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreezeStatus {
    pub original_speed: f32,
    pub until: Duration,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub position: Vec2,
    pub size: f32,
    pub speed: f32,
    pub health: Health,
    pub frozen: Option<FreezeStatus>,
}

impl Enemy {
    pub fn new(id: EnemyId, position: Vec2) -> Self {
        Self { id, position, size: ENEMY_SIZE, speed: ENEMY_SPEED, health: Health::new(ENEMY_HEALTH), frozen: None }
    }

    pub fn chase(&mut self, target: Vec2) {
        self.position += (target - self.position).normalize_or_zero() * self.speed;
    }

    pub fn is_frozen(&self) -> bool { self.frozen.is_some() }

    /// Stops the enemy until `now + duration`, or later if an earlier freeze already runs longer.
    /// Returns the expiry the caller must schedule the thaw for.
    pub fn freeze(&mut self, now: Duration, duration: Duration, generation: u64) -> Duration {
        let until = now + duration;
        let status = match self.frozen {
            Some(status) => FreezeStatus { original_speed: status.original_speed, until: status.until.max(until), generation },
            None => FreezeStatus { original_speed: self.speed, until, generation },
        };
        self.speed = 0.0;
        self.frozen = Some(status);
        status.until
    }

    /// Restores the pre-freeze speed if `generation` is the live freeze.
    pub fn thaw(&mut self, generation: u64) -> bool {
        match self.frozen {
            Some(status) if status.generation == generation => {
                self.speed = status.original_speed;
                self.frozen = None;
                true
            }
            _ => false,
        }
    }
}

/// Fires every [`ENEMY_SPAWN_INTERVAL`] of simulation time.
#[derive(Debug, Clone, Copy)]
pub struct EnemySpawner {
    pub next_spawn_at: Duration,
}

impl Default for EnemySpawner {
    fn default() -> Self { Self { next_spawn_at: ENEMY_SPAWN_INTERVAL } }
}

impl EnemySpawner {
    pub fn due(&mut self, now: Duration) -> bool {
        if now >= self.next_spawn_at {
            self.next_spawn_at = now + ENEMY_SPAWN_INTERVAL;
            true
        } else {
            false
        }
    }
}

/// Random point just outside one of the four field edges.
pub fn edge_spawn_position(rng: &mut impl Rng, bounds: Vec2) -> Vec2 {
    match rng.gen_range(0..4) {
        0 => Vec2::new(rng.gen_range(0.0..bounds.x), bounds.y + SPAWN_EDGE_MARGIN),
        1 => Vec2::new(bounds.x + SPAWN_EDGE_MARGIN, rng.gen_range(0.0..bounds.y)),
        2 => Vec2::new(rng.gen_range(0.0..bounds.x), -SPAWN_EDGE_MARGIN),
        _ => Vec2::new(-SPAWN_EDGE_MARGIN, rng.gen_range(0.0..bounds.y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn refreeze_keeps_original_speed() {
        let mut enemy = Enemy::new(EnemyId(1), Vec2::ZERO);
        let first = enemy.freeze(Duration::ZERO, Duration::from_millis(3000), 1);
        assert_eq!(first, Duration::from_millis(3000));
        assert_eq!(enemy.speed, 0.0);
        let second = enemy.freeze(Duration::from_millis(1000), Duration::from_millis(5000), 2);
        assert_eq!(second, Duration::from_millis(6000));
        assert!(!enemy.thaw(1));
        assert_eq!(enemy.speed, 0.0);
        assert!(enemy.thaw(2));
        assert_eq!(enemy.speed, 1.5);
    }

    #[test]
    fn shorter_refreeze_keeps_later_expiry() {
        let mut enemy = Enemy::new(EnemyId(1), Vec2::ZERO);
        enemy.freeze(Duration::ZERO, Duration::from_millis(5000), 1);
        let until = enemy.freeze(Duration::from_millis(100), Duration::from_millis(3000), 2);
        assert_eq!(until, Duration::from_millis(5000));
    }

    #[test]
    fn spawns_land_outside_the_field() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = Vec2::new(900.0, 900.0);
        for _ in 0..200 {
            let p = edge_spawn_position(&mut rng, bounds);
            let outside = p.x < 0.0 || p.y < 0.0 || p.x > bounds.x || p.y > bounds.y;
            assert!(outside, "{p:?} should be off-field");
        }
    }

    #[test]
    fn spawner_fires_on_interval() {
        let mut spawner = EnemySpawner::default();
        assert!(!spawner.due(Duration::from_millis(1999)));
        assert!(spawner.due(Duration::from_millis(2000)));
        assert!(!spawner.due(Duration::from_millis(3999)));
        assert!(spawner.due(Duration::from_millis(4000)));
    }

    #[test]
    fn chase_moves_at_constant_speed() {
        let mut enemy = Enemy::new(EnemyId(1), Vec2::ZERO);
        enemy.chase(Vec2::new(100.0, 0.0));
        assert_eq!(enemy.position, Vec2::new(1.5, 0.0));
    }
}
