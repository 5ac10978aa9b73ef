use bevy::math::Vec2;
use bevy::prelude::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcKind {
    Gacha,
    Quest,
}

#[derive(Debug, Clone, Copy)]
pub struct Npc {
    pub kind: NpcKind,
    pub name: &'static str,
    pub greeting: &'static str,
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
    pub interaction_radius: f32,
}

pub static NPCS: [Npc; 2] = [
    Npc {
        kind: NpcKind::Gacha,
        name: "Gacha Master",
        greeting: "Welcome! Spin the wheel of destiny!",
        position: Vec2::new(150.0, 150.0),
        size: 40.0,
        color: Color::rgb(1.0, 0.84, 0.0),
        interaction_radius: 80.0,
    },
    Npc {
        kind: NpcKind::Quest,
        name: "Quest Giver",
        greeting: "I have tasks for brave warriors!",
        position: Vec2::new(650.0, 150.0),
        size: 40.0,
        color: Color::rgb(0.42, 0.36, 0.91),
        interaction_radius: 80.0,
    },
];

/// Closest NPC whose interaction radius contains `position`.
pub fn nearest_npc(position: Vec2) -> Option<&'static Npc> {
    NPCS.iter()
        .filter(|npc| npc.position.distance(position) < npc.interaction_radius)
        .min_by(|a, b| a.position.distance(position).total_cmp(&b.position.distance(position)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_requires_proximity() {
        assert_eq!(nearest_npc(Vec2::new(160.0, 150.0)).map(|npc| npc.kind), Some(NpcKind::Gacha));
        assert_eq!(nearest_npc(Vec2::new(650.0, 220.0)).map(|npc| npc.kind), Some(NpcKind::Quest));
        assert!(nearest_npc(Vec2::new(400.0, 400.0)).is_none());
    }
}
