use bevy::math::Vec2;
use devil_fruit_arena::combat::damage_enemy;
use devil_fruit_arena::quests::{QuestError, QuestStatus};
use devil_fruit_arena::simulation::Simulation;

fn kill_enemies(sim: &mut Simulation, count: usize) {
    for _ in 0..count {
        let id = sim.spawn_enemy(Vec2::new(800.0, 100.0));
        damage_enemy(sim, id, 30.0);
    }
}

#[test]
fn test_boss_quest_requires_the_first_one() {
    let mut sim = Simulation::with_seed(5);
    assert_eq!(sim.quests.status("quest2"), Some(QuestStatus::Locked));
    assert_eq!(sim.accept_quest("quest2"), Err(QuestError::NotOfferable("quest2")));
}

#[test]
fn test_quest_line_from_accept_to_claim() {
    let mut sim = Simulation::with_seed(6);
    kill_enemies(&mut sim, 3);
    assert!(sim.accept_quest("quest1").is_ok());
    assert_eq!(sim.accept_quest("quest1"), Err(QuestError::NotOfferable("quest1")));
    kill_enemies(&mut sim, 4);
    assert_eq!(sim.quests.status("quest1"), Some(QuestStatus::Active { progress: 4, target: 5 }));
    assert_eq!(sim.claim_quest("quest1"), Err(QuestError::NotClaimable("quest1")));

    kill_enemies(&mut sim, 2);
    assert_eq!(sim.quests.status("quest1"), Some(QuestStatus::Active { progress: 5, target: 5 }));
    assert_eq!(sim.notifications.iter().filter(|n| n.text == "Quest Complete! Return to NPC").count(), 1);

    let coins = sim.player.coins;
    assert!(sim.claim_quest("quest1").is_ok());
    assert_eq!(sim.player.coins, coins + 100);
    assert_eq!(sim.quests.status("quest1"), Some(QuestStatus::Completed));
    assert_eq!(sim.quests.status("quest2"), Some(QuestStatus::Offerable));
    assert!(sim.claim_quest("quest1").is_err());
    assert!(sim.take_save_request());
}
