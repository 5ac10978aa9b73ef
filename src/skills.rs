use bevy::prelude::Color;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Rarity::Common => Color::rgb(0.75, 0.75, 0.75),
            Rarity::Rare => Color::rgb(0.25, 0.55, 1.0),
            Rarity::Epic => Color::rgb(0.65, 0.3, 0.95),
            Rarity::Legendary => Color::rgb(1.0, 0.84, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FruitId {
    Flame,
    Ice,
    Light,
    Dark,
    Wind,
    Magma,
    Quake,
    Buddha,
    Electric,
    Venom,
}

impl FruitId {
    pub const ALL: [FruitId; 10] = [
        FruitId::Flame, FruitId::Ice, FruitId::Light, FruitId::Dark, FruitId::Wind,
        FruitId::Magma, FruitId::Quake, FruitId::Buddha, FruitId::Electric, FruitId::Venom,
    ];

    /// Stable key used in save files.
    pub fn key(self) -> &'static str {
        match self {
            FruitId::Flame => "flame",
            FruitId::Ice => "ice",
            FruitId::Light => "light",
            FruitId::Dark => "dark",
            FruitId::Wind => "wind",
            FruitId::Magma => "magma",
            FruitId::Quake => "quake",
            FruitId::Buddha => "buddha",
            FruitId::Electric => "electric",
            FruitId::Venom => "venom",
        }
    }

    pub fn from_key(key: &str) -> Option<FruitId> { FruitId::ALL.into_iter().find(|id| id.key() == key) }

    pub fn fruit(self) -> &'static Fruit { &FRUITS[self as usize] }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillSlot {
    Z,
    X,
    C,
}

impl SkillSlot {
    pub const ALL: [SkillSlot; 3] = [SkillSlot::Z, SkillSlot::X, SkillSlot::C];
    pub fn index(self) -> usize { self as usize }
    pub fn key_label(self) -> &'static str { match self { SkillSlot::Z => "Z", SkillSlot::X => "X", SkillSlot::C => "C" } }
}

/// Effect family a skill belongs to. Executors are keyed by fruit and slot; this is descriptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillArchetype {
    Projectile,
    Instant,
    Wave,
    Aoe,
    Freeze,
    Domain,
    Rain,
    Ultimate,
    BlackHole,
    Gravity,
    Slash,
    Knockback,
    Melee,
    Meteor,
    Eruption,
    Shockwave,
    Earthquake,
    Cataclysm,
    Transform,
    Chain,
    Storm,
    Pool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillDefinition {
    pub name: &'static str,
    pub cooldown_ms: u64,
    pub damage: f32,
    pub archetype: SkillArchetype,
}

impl SkillDefinition {
    pub fn cooldown(&self) -> Duration { Duration::from_millis(self.cooldown_ms) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fruit {
    pub id: FruitId,
    pub name: &'static str,
    pub rarity: Rarity,
    pub atk_bonus: f32,
    pub speed_bonus: f32,
    pub color: Color,
    pub skills: [SkillDefinition; 3],
}

impl Fruit {
    pub fn skill(&self, slot: SkillSlot) -> Option<&SkillDefinition> { self.skills.get(slot.index()) }
}

const fn skill(name: &'static str, cooldown_ms: u64, damage: f32, archetype: SkillArchetype) -> SkillDefinition {
    SkillDefinition { name, cooldown_ms, damage, archetype }
}

use SkillArchetype as A;

/// Static catalog, indexed by `FruitId as usize`.
pub static FRUITS: [Fruit; 10] = [
    Fruit { id: FruitId::Flame, name: "Flame Fruit", rarity: Rarity::Common, atk_bonus: 15.0, speed_bonus: 0.0, color: Color::rgb(1.0, 0.27, 0.0),
        skills: [skill("Fire Fist", 4000, 25.0, A::Projectile), skill("Flame Wave", 8000, 40.0, A::Wave), skill("Inferno Blast", 12000, 80.0, A::Aoe)] },
    Fruit { id: FruitId::Ice, name: "Ice Fruit", rarity: Rarity::Common, atk_bonus: 5.0, speed_bonus: 0.0, color: Color::rgb(0.0, 0.75, 1.0),
        skills: [skill("Ice Shard", 3500, 15.0, A::Projectile), skill("Glacial Burst", 8000, 35.0, A::Freeze), skill("Frozen Domain", 15000, 60.0, A::Domain)] },
    Fruit { id: FruitId::Light, name: "Light Fruit", rarity: Rarity::Rare, atk_bonus: 10.0, speed_bonus: 2.0, color: Color::rgb(1.0, 1.0, 0.0),
        skills: [skill("Light Beam", 2500, 20.0, A::Instant), skill("Sacred Rain", 7000, 45.0, A::Rain), skill("Divine Judgment", 10000, 100.0, A::Ultimate)] },
    Fruit { id: FruitId::Dark, name: "Dark Fruit", rarity: Rarity::Rare, atk_bonus: 8.0, speed_bonus: 0.0, color: Color::rgb(0.29, 0.0, 0.51),
        skills: [skill("Shadow Pulse", 4000, 18.0, A::Wave), skill("Black Hole", 9000, 50.0, A::BlackHole), skill("Void Collapse", 14000, 85.0, A::Gravity)] },
    Fruit { id: FruitId::Wind, name: "Wind Fruit", rarity: Rarity::Common, atk_bonus: 3.0, speed_bonus: 1.5, color: Color::rgb(0.56, 0.93, 0.56),
        skills: [skill("Wind Slash", 3000, 12.0, A::Slash), skill("Tornado Spin", 7000, 38.0, A::Knockback), skill("Hurricane Fury", 11000, 70.0, A::Aoe)] },
    Fruit { id: FruitId::Magma, name: "Magma Fruit", rarity: Rarity::Epic, atk_bonus: 20.0, speed_bonus: -0.5, color: Color::rgb(0.55, 0.0, 0.0),
        skills: [skill("Lava Fist", 4500, 30.0, A::Melee), skill("Meteor Shower", 9000, 55.0, A::Meteor), skill("Volcanic Eruption", 16000, 90.0, A::Eruption)] },
    Fruit { id: FruitId::Quake, name: "Quake Fruit", rarity: Rarity::Legendary, atk_bonus: 25.0, speed_bonus: -1.0, color: Color::rgb(1.0, 1.0, 1.0),
        skills: [skill("Tremor Punch", 5000, 35.0, A::Shockwave), skill("Earthquake", 10000, 65.0, A::Earthquake), skill("Cataclysm", 18000, 120.0, A::Cataclysm)] },
    Fruit { id: FruitId::Buddha, name: "Buddha Fruit", rarity: Rarity::Legendary, atk_bonus: 12.0, speed_bonus: 0.0, color: Color::rgb(1.0, 0.84, 0.0),
        skills: [skill("Palm Strike", 4000, 28.0, A::Melee), skill("Buddha Form", 12000, 0.0, A::Transform), skill("Divine Impact", 15000, 95.0, A::Ultimate)] },
    Fruit { id: FruitId::Electric, name: "Electric Fruit", rarity: Rarity::Epic, atk_bonus: 18.0, speed_bonus: 1.0, color: Color::rgb(1.0, 0.92, 0.2),
        skills: [skill("Thunder Strike", 3500, 22.0, A::Instant), skill("Chain Lightning", 8000, 48.0, A::Chain), skill("Thunder God", 13000, 88.0, A::Storm)] },
    Fruit { id: FruitId::Venom, name: "Venom Fruit", rarity: Rarity::Epic, atk_bonus: 10.0, speed_bonus: 0.0, color: Color::rgb(0.58, 0.0, 0.83),
        skills: [skill("Poison Spit", 3500, 15.0, A::Projectile), skill("Venom Pool", 8500, 42.0, A::Pool), skill("Hydra", 14000, 78.0, A::Ultimate)] },
];

pub fn fruits_of_rarity(rarity: Rarity) -> Vec<FruitId> {
    FRUITS.iter().filter(|fruit| fruit.rarity == rarity).map(|fruit| fruit.id).collect()
}

/// Cooldown bookkeeping for one skill slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotCooldown {
    pub ready: bool,
    pub last_used: Duration,
    pub duration: Duration,
}

impl Default for SlotCooldown {
    fn default() -> Self { Self { ready: true, last_used: Duration::ZERO, duration: Duration::ZERO } }
}

impl SlotCooldown {
    pub fn is_ready(&self) -> bool { self.ready }

    pub fn trigger(&mut self, now: Duration, duration: Duration) {
        self.ready = false;
        self.last_used = now;
        self.duration = duration;
    }

    pub fn poll(&mut self, now: Duration) {
        if !self.ready && now.saturating_sub(self.last_used) >= self.duration {
            self.ready = true;
        }
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        if self.ready { Duration::ZERO } else { self.duration.saturating_sub(now.saturating_sub(self.last_used)) }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillCooldowns {
    slots: [SlotCooldown; 3],
}

impl SkillCooldowns {
    pub fn slot(&self, slot: SkillSlot) -> &SlotCooldown { &self.slots[slot.index()] }
    pub fn slot_mut(&mut self, slot: SkillSlot) -> &mut SlotCooldown { &mut self.slots[slot.index()] }
    pub fn poll(&mut self, now: Duration) { self.slots.iter_mut().for_each(|slot| slot.poll(now)); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_fruit_id() {
        for id in FruitId::ALL {
            assert_eq!(id.fruit().id, id);
            assert_eq!(FruitId::from_key(id.key()), Some(id));
        }
        assert_eq!(FruitId::from_key("banana"), None);
    }

    #[test]
    fn every_rarity_has_fruits() {
        assert_eq!(fruits_of_rarity(Rarity::Common).len(), 3);
        assert_eq!(fruits_of_rarity(Rarity::Rare).len(), 2);
        assert_eq!(fruits_of_rarity(Rarity::Epic).len(), 3);
        assert_eq!(fruits_of_rarity(Rarity::Legendary).len(), 2);
    }

    #[test]
    fn slot_becomes_ready_once_duration_elapses() {
        let mut slot = SlotCooldown::default();
        slot.trigger(Duration::from_millis(1000), Duration::from_millis(4000));
        slot.poll(Duration::from_millis(4999));
        assert!(!slot.is_ready());
        assert_eq!(slot.remaining(Duration::from_millis(4000)), Duration::from_millis(1000));
        slot.poll(Duration::from_millis(5000));
        assert!(slot.is_ready());
        assert_eq!(slot.remaining(Duration::from_millis(5000)), Duration::ZERO);
    }
}
