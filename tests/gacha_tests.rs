use devil_fruit_arena::gacha::{draw, roll_rarity, GachaError, GACHA_COST, RARITY_WEIGHTS};
use devil_fruit_arena::player::Player;
use devil_fruit_arena::simulation::Simulation;
use devil_fruit_arena::skills::Rarity;
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_fifty_coins_buy_five_spins() {
    let mut sim = Simulation::with_seed(3);
    for _ in 0..5 {
        assert!(sim.draw_gacha().is_ok());
    }
    assert_eq!(sim.player.coins, 0);
    let fruit = sim.player.fruit;
    assert_eq!(sim.draw_gacha(), Err(GachaError::InsufficientCoins { have: 0, need: GACHA_COST }));
    assert_eq!(sim.player.fruit, fruit);
    assert!(sim.notifications.last().is_some_and(|n| n.text.starts_with("Not enough coins")));
}

#[test]
fn test_failed_draw_leaves_player_untouched() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut player = Player::new();
    player.coins = 9;
    assert!(draw(&mut player, &mut rng).is_err());
    assert_eq!(player.coins, 9);
    assert_eq!(player.fruit, None);
}

#[test]
fn test_rarity_frequencies_follow_weights() {
    let mut rng = StdRng::seed_from_u64(2024);
    let draws = 100_000;
    let mut counts = [0u32; 4];
    for _ in 0..draws {
        let rarity = roll_rarity(&mut rng, &RARITY_WEIGHTS);
        counts[Rarity::ALL.iter().position(|r| *r == rarity).unwrap_or(0)] += 1;
    }
    for ((_, weight), count) in RARITY_WEIGHTS.iter().zip(counts) {
        let observed = count as f32 / draws as f32;
        assert!((observed - weight / 100.0).abs() < 0.01, "{weight}: observed {observed}");
    }
}
