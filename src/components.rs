/// Health pool that never leaves `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self { Self { current: max, max } }

    pub fn current(&self) -> f32 { self.current }
    pub fn max(&self) -> f32 { self.max }
    pub fn is_depleted(&self) -> bool { self.current <= 0.0 }
    pub fn fraction(&self) -> f32 { if self.max > 0.0 { self.current / self.max } else { 0.0 } }

    /// Removes up to `amount` and returns what was actually taken.
    pub fn damage(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.set(self.current - amount.max(0.0));
        before - self.current
    }

    pub fn heal_full(&mut self) { self.current = self.max; }

    pub fn set(&mut self, value: f32) { self.current = value.clamp(0.0, self.max); }

    /// Changes the maximum; the current value is re-clamped.
    pub fn set_max(&mut self, max: f32) {
        self.max = max.max(0.0);
        self.current = self.current.min(self.max);
    }
}

/// Stable identity of a spawned enemy, never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u64);

/// Anything a damage-bearing effect can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Enemy(EnemyId),
    Boss,
}

/// Frame countdown shared by the transient effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub remaining: u32,
    pub total: u32,
}

impl Lifetime {
    pub fn frames(total: u32) -> Self { Self { remaining: total, total } }
    /// Counts one frame down; false once expired.
    pub fn tick(&mut self) -> bool { self.remaining = self.remaining.saturating_sub(1); self.remaining > 0 }
    pub fn age(&self) -> u32 { self.total - self.remaining }
    /// Fraction of life left, 1.0 when fresh.
    pub fn alpha(&self) -> f32 { if self.total == 0 { 0.0 } else { self.remaining as f32 / self.total as f32 } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_stays_in_bounds() {
        let mut health = Health::new(30.0);
        assert_eq!(health.damage(20.0), 20.0);
        assert_eq!(health.current(), 10.0);
        assert_eq!(health.damage(50.0), 10.0);
        assert_eq!(health.current(), 0.0);
        assert!(health.is_depleted());
        health.set(500.0);
        assert_eq!(health.current(), 30.0);
        health.damage(-5.0);
        assert_eq!(health.current(), 30.0);
        health.set_max(20.0);
        assert_eq!(health.current(), 20.0);
    }

    #[test]
    fn lifetime_counts_down_to_expiry() {
        let mut life = Lifetime::frames(2);
        assert!(life.tick());
        assert_eq!(life.age(), 1);
        assert!(!life.tick());
        assert!(!life.tick());
        assert_eq!(life.alpha(), 0.0);
    }
}
