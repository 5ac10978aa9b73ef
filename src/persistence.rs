//! Save file handling: a RON snapshot of progression, written on request, on a timer and on exit.

use bevy::app::AppExit;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error;

use crate::game::GameConfig;
use crate::player::{exp_needed_for_level, BASE_ATTACK, INITIAL_PLAYER_MAX_HEALTH, MAX_LOADED_LEVEL, STARTING_COINS};
use crate::quests::QuestProgress;
use crate::simulation::Simulation;
use crate::skills::FruitId;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not serialize save data: {0}")]
    Serialize(#[from] ron::Error),
    #[error("save file is corrupt: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSave {
    pub coins: u32,
    pub fruit: Option<String>,
    pub level: u32,
    pub exp: u32,
    pub kills: u32,
    pub attack: f32,
    pub health: f32,
    pub max_health: f32,
}

impl Default for PlayerSave {
    fn default() -> Self {
        Self {
            coins: STARTING_COINS,
            fruit: None,
            level: 1,
            exp: 0,
            kills: 0,
            attack: BASE_ATTACK,
            health: INITIAL_PLAYER_MAX_HEALTH,
            max_health: INITIAL_PLAYER_MAX_HEALTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestSave {
    pub id: String,
    pub active: bool,
    pub progress: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcSave {
    pub quest_available: bool,
}

impl Default for NpcSave {
    fn default() -> Self { Self { quest_available: true } }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossSave {
    pub spawned: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub player: PlayerSave,
    pub quests: Vec<QuestSave>,
    pub npc: NpcSave,
    pub boss: BossSave,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl SaveData {
    pub fn capture(sim: &Simulation) -> Self {
        let player = &sim.player;
        Self {
            player: PlayerSave {
                coins: player.coins,
                fruit: player.fruit.map(|fruit| fruit.key().to_string()),
                level: player.level,
                exp: player.exp,
                kills: player.kills,
                attack: player.attack,
                // a save is never written dead
                health: player.health.current().max(1.0),
                max_health: player.health.max(),
            },
            quests: sim
                .quests
                .snapshot()
                .into_iter()
                .map(|(id, p)| QuestSave { id: id.to_string(), active: p.active, progress: p.progress, completed: p.completed })
                .collect(),
            npc: NpcSave { quest_available: sim.quests.any_offerable() },
            boss: BossSave { spawned: !matches!(sim.boss.lifecycle, crate::boss::BossLifecycle::Inactive), active: sim.boss.is_active() },
            timestamp: std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default(),
        }
    }

    /// Restores progression into a fresh simulation.
    pub fn apply(&self, sim: &mut Simulation) {
        let saved = &self.player;
        let player = &mut sim.player;
        player.coins = saved.coins;
        player.fruit = saved.fruit.as_deref().and_then(FruitId::from_key);
        if saved.fruit.is_some() && player.fruit.is_none() {
            warn!("unknown fruit {:?} in save, leaving hands empty", saved.fruit);
        }
        player.level = saved.level.clamp(1, MAX_LOADED_LEVEL);
        player.exp = saved.exp;
        player.exp_needed = exp_needed_for_level(player.level);
        player.kills = saved.kills;
        player.recompute_stats();
        player.attack = saved.attack;
        player.health.set_max(saved.max_health.max(1.0));
        player.health.set(saved.health.max(1.0));
        player.dead = false;

        sim.quests.restore(
            self.quests.iter().map(|q| (q.id.clone(), QuestProgress { active: q.active, progress: q.progress, completed: q.completed })),
        );
    }

    pub fn to_ron(&self) -> Result<String, SaveError> { Ok(ron::ser::to_string_pretty(self, Default::default())?) }

    pub fn from_ron(content: &str) -> Result<Self, SaveError> { Ok(ron::from_str(content)?) }

    /// `Ok(None)` when there is no save yet.
    pub fn read(path: &Path) -> Result<Option<Self>, SaveError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_ron(&content).map(Some),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Removes the save file. `Ok(false)` when there was none.
    pub fn delete(path: &Path) -> Result<bool, SaveError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), SaveError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

/// Deletes the save file and returns the simulation to a first-launch state.
/// The simulation is left untouched when the file cannot be removed.
pub fn reset_progress(path: &Path, sim: &mut Simulation) -> Result<(), SaveError> {
    if SaveData::delete(path)? {
        info!("deleted save at '{}'", path.display());
    }
    sim.reset_progress();
    Ok(())
}

#[derive(Resource)]
struct AutosaveTimer(Timer);

pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_autosave, load_game))
            .add_systems(Update, (flush_save_requests, autosave))
            .add_systems(Last, save_on_exit);
    }
}

fn setup_autosave(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(AutosaveTimer(Timer::new(config.autosave_interval, TimerMode::Repeating)));
}

pub fn load_game(config: Res<GameConfig>, mut sim: ResMut<Simulation>) {
    match SaveData::read(&config.save_path) {
        Ok(Some(data)) => {
            data.apply(&mut sim);
            info!("loaded save from '{}' (level {}, {} coins)", config.save_path.display(), sim.player.level, sim.player.coins);
        }
        Ok(None) => info!("no save at '{}', starting fresh", config.save_path.display()),
        Err(e) => warn!("unable to load '{}', starting fresh: {e}", config.save_path.display()),
    }
}

fn write_save(config: &GameConfig, sim: &Simulation) {
    match SaveData::capture(sim).write(&config.save_path) {
        Ok(()) => debug!("game saved to '{}'", config.save_path.display()),
        Err(e) => warn!("save failed: {e}"),
    }
}

fn flush_save_requests(config: Res<GameConfig>, mut sim: ResMut<Simulation>) {
    if sim.take_save_request() {
        write_save(&config, &sim);
    }
}

fn autosave(time: Res<Time>, config: Res<GameConfig>, sim: Res<Simulation>, mut timer: ResMut<AutosaveTimer>) {
    if timer.0.tick(time.delta()).just_finished() {
        write_save(&config, &sim);
    }
}

fn save_on_exit(mut exits: EventReader<AppExit>, config: Res<GameConfig>, sim: Res<Simulation>) {
    if exits.read().next().is_some() {
        info!("saving before exit");
        write_save(&config, &sim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_player_is_saved_with_one_health() {
        let mut sim = Simulation::with_seed(1);
        sim.player.take_damage(500.0);
        let data = SaveData::capture(&sim);
        assert_eq!(data.player.health, 1.0);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let data = SaveData::from_ron("(player: (coins: 70))");
        let data = data.unwrap_or_default();
        assert_eq!(data.player.coins, 70);
        assert_eq!(data.player.level, 1);
        assert!(data.npc.quest_available);
        assert!(data.quests.is_empty());
    }

    #[test]
    fn absurd_level_is_clamped_on_load() {
        let Ok(data) = SaveData::from_ron("(player: (level: 4000000000))") else { panic!("save should parse") };
        let mut sim = Simulation::with_seed(2);
        data.apply(&mut sim);
        assert_eq!(sim.player.level, MAX_LOADED_LEVEL);
        assert_eq!(sim.player.exp_needed, exp_needed_for_level(MAX_LOADED_LEVEL));
    }

    #[test]
    fn deleting_a_missing_save_is_not_an_error() {
        let path = std::env::temp_dir().join("devil_fruit_arena_never_written.ron");
        assert!(matches!(SaveData::delete(&path), Ok(false)));
    }

    #[test]
    fn corrupt_save_is_an_error() {
        assert!(matches!(SaveData::from_ron("(player: ["), Err(SaveError::Deserialize(_))));
    }
}
