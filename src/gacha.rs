use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::player::Player;
use crate::skills::{fruits_of_rarity, FruitId, Rarity};

pub const GACHA_COST: u32 = 10;

pub const RARITY_WEIGHTS: [(Rarity, f32); 4] = [
    (Rarity::Common, 50.0),
    (Rarity::Rare, 30.0),
    (Rarity::Epic, 15.0),
    (Rarity::Legendary, 5.0),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GachaError {
    #[error("not enough coins: need {need}, have {have}")]
    InsufficientCoins { have: u32, need: u32 },
}

/// Cumulative-weight pick: subtract each weight from `random * total` until the rest is non-positive.
pub fn roll_rarity(rng: &mut impl Rng, weights: &[(Rarity, f32)]) -> Rarity {
    let total: f32 = weights.iter().map(|(_, weight)| weight).sum();
    let mut remaining = rng.gen::<f32>() * total;
    for (rarity, weight) in weights {
        remaining -= weight;
        if remaining <= 0.0 {
            return *rarity;
        }
    }
    weights.last().map_or(Rarity::Common, |(rarity, _)| *rarity)
}

/// Picks a rarity tier, then a fruit uniformly within it.
pub fn roll_fruit(rng: &mut impl Rng) -> FruitId {
    let rarity = roll_rarity(rng, &RARITY_WEIGHTS);
    let pool = fruits_of_rarity(rarity);
    pool.choose(rng).copied().or_else(|| FruitId::ALL.choose(rng).copied()).unwrap_or(FruitId::Flame)
}

/// Spends [`GACHA_COST`] and equips a random fruit. Leaves the player untouched when short of coins.
pub fn draw(player: &mut Player, rng: &mut impl Rng) -> Result<FruitId, GachaError> {
    if player.coins < GACHA_COST {
        return Err(GachaError::InsufficientCoins { have: player.coins, need: GACHA_COST });
    }
    player.coins -= GACHA_COST;
    let fruit = roll_fruit(rng);
    player.fruit = Some(fruit);
    player.recompute_stats();
    Ok(fruit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn draw_equips_and_recomputes() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut player = Player::new();
        let fruit = draw(&mut player, &mut rng);
        assert!(fruit.is_ok());
        assert_eq!(player.coins, 40);
        assert_eq!(player.fruit, fruit.ok());
        let bonus = player.fruit.map(|f| f.fruit().atk_bonus).unwrap_or_default();
        assert_eq!(player.attack, 10.0 + bonus);
    }

    #[test]
    fn single_weight_table_always_wins() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(roll_rarity(&mut rng, &[(Rarity::Epic, 1.0)]), Rarity::Epic);
        }
    }
}
