use bevy::prelude::*;
use std::{path::PathBuf, time::Duration};

use crate::{
    camera_systems::CameraZoom,
    gacha::GACHA_COST,
    input::PendingInput,
    npc::{nearest_npc, NpcKind},
    persistence::{self, load_game},
    quests::{QuestStatus, QUESTS},
    simulation::Simulation,
    skills::SkillSlot,
};

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;
pub const SIMULATION_HZ: f64 = 60.0;
const DEFAULT_SAVE_FILE: &str = "devil_fruit_save.ron";
const SAVE_PATH_ENV: &str = "DEVIL_FRUIT_SAVE";
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);
const NOTIFICATION_VISIBLE: Duration = Duration::from_secs(3);
const RESET_PROGRESS_KEY: KeyCode = KeyCode::F9;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    InGame,
    GachaDialog,
    QuestDialog,
    Respawn,
}

#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub save_path: PathBuf,
    pub autosave_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        let save_path = std::env::var_os(SAVE_PATH_ENV).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_FILE));
        Self { width: SCREEN_WIDTH, height: SCREEN_HEIGHT, save_path, autosave_interval: AUTOSAVE_INTERVAL }
    }
}

pub struct GamePlugin;

#[derive(Component)] struct InGameUI;
#[derive(Component)] struct GachaDialogUI;
#[derive(Component)] struct QuestDialogUI;
#[derive(Component)] struct RespawnUI;
#[derive(Component)] struct DialogBody;

#[derive(Component, Clone, Copy)]
enum HudLine { Health, Progress, Wallet, Fruit, Skills, Quest, Boss, Hint, Notification }

const UI_TEXT_COLOR: Color = Color::rgb(0.9, 0.9, 0.9);
const UI_PANEL_BG_COLOR: Color = Color::rgba(0.05, 0.05, 0.07, 0.92);

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .init_resource::<GameConfig>()
            .init_resource::<Simulation>()
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .add_systems(Startup, (start_session.after(load_game), setup_ingame_ui))
            .add_systems(FixedUpdate, simulation_tick)
            .add_systems(Update, (interact_with_npc, reset_progress_on_key, watch_for_death).chain().run_if(in_state(AppState::InGame)))
            .add_systems(Update, update_ingame_ui)
            .add_systems(OnEnter(AppState::GachaDialog), setup_gacha_dialog)
            .add_systems(Update, (gacha_dialog_input, refresh_gacha_dialog).chain().run_if(in_state(AppState::GachaDialog)))
            .add_systems(OnExit(AppState::GachaDialog), despawn_ui_by_marker::<GachaDialogUI>)
            .add_systems(OnEnter(AppState::QuestDialog), setup_quest_dialog)
            .add_systems(Update, (quest_dialog_input, refresh_quest_dialog).chain().run_if(in_state(AppState::QuestDialog)))
            .add_systems(OnExit(AppState::QuestDialog), despawn_ui_by_marker::<QuestDialogUI>)
            .add_systems(OnEnter(AppState::Respawn), setup_respawn_ui)
            .add_systems(Update, respawn_input.run_if(in_state(AppState::Respawn)))
            .add_systems(OnExit(AppState::Respawn), despawn_ui_by_marker::<RespawnUI>);
    }
}

/// The boss is present from the start of every session.
fn start_session(mut sim: ResMut<Simulation>) {
    sim.spawn_boss();
}

fn simulation_tick(mut sim: ResMut<Simulation>, mut pending: ResMut<PendingInput>) {
    let input = pending.take();
    sim.step(&input);
}

fn interact_with_npc(keys: Res<ButtonInput<KeyCode>>, sim: Res<Simulation>, mut next_app_state: ResMut<NextState<AppState>>) {
    if !keys.just_pressed(KeyCode::KeyE) || sim.player.dead {
        return;
    }
    match sim.interact() {
        Some(NpcKind::Gacha) => next_app_state.set(AppState::GachaDialog),
        Some(NpcKind::Quest) => next_app_state.set(AppState::QuestDialog),
        None => {}
    }
}

/// Wipes the save and starts over with a fresh session.
fn reset_progress_on_key(keys: Res<ButtonInput<KeyCode>>, config: Res<GameConfig>, mut sim: ResMut<Simulation>) {
    if !keys.just_pressed(RESET_PROGRESS_KEY) {
        return;
    }
    match persistence::reset_progress(&config.save_path, &mut sim) {
        Ok(()) => {
            sim.spawn_boss();
        }
        Err(e) => warn!("could not reset progress: {e}"),
    }
}

fn watch_for_death(sim: Res<Simulation>, mut next_app_state: ResMut<NextState<AppState>>) {
    if sim.player.dead {
        next_app_state.set(AppState::Respawn);
    }
}

fn despawn_ui_by_marker<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) { for entity in query.iter() { commands.entity(entity).despawn_recursive(); } }

fn text_style(font_size: f32, color: Color) -> TextStyle { TextStyle { font_size, color, ..default() } }

fn setup_ingame_ui(mut commands: Commands) {
    commands.spawn((
        NodeBundle {
            style: Style { width: Val::Percent(100.0), height: Val::Percent(100.0), flex_direction: FlexDirection::Column, justify_content: JustifyContent::SpaceBetween, padding: UiRect::all(Val::Px(10.0)), position_type: PositionType::Absolute, ..default() },
            z_index: ZIndex::Global(1),
            ..default()
        },
        InGameUI,
    )).with_children(|parent| {
        parent.spawn(NodeBundle {
            style: Style { flex_direction: FlexDirection::Column, padding: UiRect::all(Val::Px(6.0)), row_gap: Val::Px(2.0), align_self: AlignSelf::FlexStart, ..default() },
            background_color: Color::rgba(0.0, 0.0, 0.0, 0.4).into(),
            ..default()
        }).with_children(|panel| {
            for (line, color) in [
                (HudLine::Health, Color::GREEN),
                (HudLine::Progress, Color::CYAN),
                (HudLine::Wallet, Color::GOLD),
                (HudLine::Fruit, UI_TEXT_COLOR),
                (HudLine::Skills, UI_TEXT_COLOR),
                (HudLine::Quest, Color::YELLOW),
                (HudLine::Boss, Color::ORANGE_RED),
            ] {
                panel.spawn((TextBundle::from_section("", text_style(18.0, color)), line));
            }
        });
        parent.spawn(NodeBundle {
            style: Style { width: Val::Percent(100.0), flex_direction: FlexDirection::Column, align_items: AlignItems::Center, row_gap: Val::Px(4.0), ..default() },
            ..default()
        }).with_children(|bottom| {
            bottom.spawn((TextBundle::from_section("", text_style(24.0, Color::GOLD)), HudLine::Notification));
            bottom.spawn((TextBundle::from_section("", text_style(18.0, UI_TEXT_COLOR)), HudLine::Hint));
        });
    });
}

fn update_ingame_ui(sim: Res<Simulation>, zoom: Res<CameraZoom>, mut lines: Query<(&HudLine, &mut Text)>) {
    let player = &sim.player;
    for (line, mut text) in lines.iter_mut() {
        let Some(section) = text.sections.get_mut(0) else { continue };
        match line {
            HudLine::Health => {
                section.value = format!("HP: {:.0}/{:.0}", player.health.current(), player.health.max());
                let fraction = player.health.fraction();
                section.style.color = if fraction < 1.0 / 3.0 { Color::RED } else if fraction < 2.0 / 3.0 { Color::YELLOW } else { Color::GREEN };
            }
            HudLine::Progress => section.value = format!("Level {}   EXP {}/{}   ATK {:.0}", player.level, player.exp, player.exp_needed, player.attack),
            HudLine::Wallet => section.value = format!("Coins: {}   Kills: {}   Zoom: {:.1}x", player.coins, player.kills, zoom.0),
            HudLine::Fruit => {
                section.value = match player.fruit {
                    Some(fruit) => format!("Fruit: {} ({})", fruit.fruit().name, fruit.fruit().rarity.label()),
                    None => "Fruit: none (visit the Gacha Master)".to_string(),
                };
                section.style.color = player.fruit.map_or(UI_TEXT_COLOR, |fruit| fruit.fruit().rarity.color());
            }
            HudLine::Skills => {
                section.value = match player.fruit {
                    Some(fruit) => SkillSlot::ALL
                        .iter()
                        .filter_map(|slot| fruit.fruit().skill(*slot).map(|skill| (slot, skill)))
                        .map(|(slot, skill)| {
                            let cooldown = sim.cooldowns.slot(*slot);
                            if cooldown.is_ready() {
                                format!("[{}] {}", slot.key_label(), skill.name)
                            } else {
                                format!("[{}] {} {:.1}s", slot.key_label(), skill.name, cooldown.remaining(sim.now).as_secs_f32())
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("   "),
                    None => String::new(),
                };
            }
            HudLine::Quest => {
                section.value = sim.quests.active().map(|(def, progress)| format!("Quest: {} {}/{}", def.name, progress.progress, def.target)).collect::<Vec<_>>().join("\n");
            }
            HudLine::Boss => {
                section.value = match (sim.boss.entity(), sim.boss.respawn_at()) {
                    (Some(boss), _) if sim.boss.player_in_arena => format!("RAID BOSS {:.0}/{:.0}", boss.health.current(), boss.health.max()),
                    (None, Some(at)) => format!("Boss returns in {}s", at.saturating_sub(sim.now).as_secs()),
                    _ => String::new(),
                };
            }
            HudLine::Hint => {
                section.value = match nearest_npc(player.position) {
                    Some(npc) => format!("[E] Talk to {}", npc.name),
                    None => "WASD move  J attack  Shift dash  Z/X/C skills  +/- zoom  F9 reset".to_string(),
                };
            }
            HudLine::Notification => match sim.notifications.last().filter(|n| sim.now.saturating_sub(n.at) < NOTIFICATION_VISIBLE) {
                Some(notification) => {
                    section.value = notification.text.clone();
                    section.style.color = notification.color;
                }
                None => section.value.clear(),
            },
        }
    }
}

fn spawn_dialog<M: Component>(commands: &mut Commands, marker: M, title: &str, color: Color) {
    commands.spawn((
        NodeBundle {
            style: Style { width: Val::Percent(100.0), height: Val::Percent(100.0), position_type: PositionType::Absolute, justify_content: JustifyContent::Center, align_items: AlignItems::Center, ..default() },
            z_index: ZIndex::Global(10),
            ..default()
        },
        marker,
    )).with_children(|parent| {
        parent.spawn(NodeBundle {
            style: Style { width: Val::Px(520.0), flex_direction: FlexDirection::Column, row_gap: Val::Px(12.0), padding: UiRect::all(Val::Px(20.0)), border: UiRect::all(Val::Px(2.0)), ..default() },
            border_color: BorderColor(color),
            background_color: UI_PANEL_BG_COLOR.into(),
            ..default()
        }).with_children(|panel| {
            panel.spawn(TextBundle::from_section(title, text_style(32.0, color)));
            panel.spawn((TextBundle::from_section("", text_style(20.0, UI_TEXT_COLOR)), DialogBody));
        });
    });
}

fn setup_gacha_dialog(mut commands: Commands) {
    let npc = crate::npc::NPCS.iter().find(|npc| npc.kind == NpcKind::Gacha);
    let title = npc.map_or("Gacha Master", |npc| npc.name);
    spawn_dialog(&mut commands, GachaDialogUI, title, Color::GOLD);
}

fn gacha_dialog_input(keys: Res<ButtonInput<KeyCode>>, mut sim: ResMut<Simulation>, mut next_app_state: ResMut<NextState<AppState>>) {
    if keys.just_pressed(KeyCode::Space) {
        if let Err(e) = sim.draw_gacha() {
            warn!("gacha spin refused: {e}");
        }
    }
    if keys.any_just_pressed([KeyCode::Escape, KeyCode::KeyE]) {
        next_app_state.set(AppState::InGame);
    }
}

fn refresh_gacha_dialog(sim: Res<Simulation>, mut body: Query<&mut Text, With<DialogBody>>) {
    let Ok(mut text) = body.get_single_mut() else { return };
    let greeting = crate::npc::NPCS.iter().find(|npc| npc.kind == NpcKind::Gacha).map_or("", |npc| npc.greeting);
    let current = sim.player.fruit.map_or("none".to_string(), |fruit| format!("{} ({})", fruit.fruit().name, fruit.fruit().rarity.label()));
    let last = sim.notifications.last().map_or(String::new(), |n| n.text.clone());
    text.sections[0].value = format!(
        "{greeting}\n\nCoins: {}\nCurrent fruit: {current}\n\nCommon 50%  Rare 30%  Epic 15%  Legendary 5%\n\n[Space] Spin ({GACHA_COST} coins)   [Esc] Leave\n\n{last}",
        sim.player.coins
    );
}

fn setup_quest_dialog(mut commands: Commands) {
    spawn_dialog(&mut commands, QuestDialogUI, "Quest Giver", Color::rgb(0.42, 0.36, 0.91));
}

fn quest_dialog_input(keys: Res<ButtonInput<KeyCode>>, mut sim: ResMut<Simulation>, mut next_app_state: ResMut<NextState<AppState>>) {
    for (key, quest) in [(KeyCode::Digit1, &QUESTS[0]), (KeyCode::Digit2, &QUESTS[1])] {
        if !keys.just_pressed(key) {
            continue;
        }
        let status = sim.quests.status(quest.id);
        let result = match status {
            Some(QuestStatus::Active { .. }) => sim.claim_quest(quest.id),
            _ => sim.accept_quest(quest.id),
        };
        if let Err(e) = result {
            warn!("quest action refused: {e}");
        }
    }
    if keys.any_just_pressed([KeyCode::Escape, KeyCode::KeyE]) {
        next_app_state.set(AppState::InGame);
    }
}

fn refresh_quest_dialog(sim: Res<Simulation>, mut body: Query<&mut Text, With<DialogBody>>) {
    let Ok(mut text) = body.get_single_mut() else { return };
    let mut lines = vec![crate::npc::NPCS.iter().find(|npc| npc.kind == NpcKind::Quest).map_or("", |npc| npc.greeting).to_string(), String::new()];
    for (index, quest) in QUESTS.iter().enumerate() {
        let action = match sim.quests.status(quest.id) {
            Some(QuestStatus::Locked) | None => "locked".to_string(),
            Some(QuestStatus::Offerable) => format!("[{}] Accept", index + 1),
            Some(QuestStatus::Active { progress, target }) if progress >= target => format!("[{}] Claim reward", index + 1),
            Some(QuestStatus::Active { progress, target }) => format!("in progress {progress}/{target}"),
            Some(QuestStatus::Completed) => "completed".to_string(),
        };
        lines.push(format!("{}: {}\n  {}  (reward {} coins, {} exp)  {action}", quest.name, quest.description, quest.id, quest.reward_coins, quest.reward_exp));
    }
    lines.push(String::new());
    lines.push("[Esc] Leave".to_string());
    text.sections[0].value = lines.join("\n");
}

fn setup_respawn_ui(mut commands: Commands) {
    commands.spawn((
        NodeBundle {
            style: Style { width: Val::Percent(100.0), height: Val::Percent(100.0), position_type: PositionType::Absolute, justify_content: JustifyContent::Center, align_items: AlignItems::Center, flex_direction: FlexDirection::Column, row_gap: Val::Px(20.0), ..default() },
            background_color: Color::rgba(0.2, 0.0, 0.0, 0.6).into(),
            z_index: ZIndex::Global(10),
            ..default()
        },
        RespawnUI,
    )).with_children(|parent| {
        parent.spawn(TextBundle::from_section("YOU DIED", text_style(80.0, Color::RED)).with_text_justify(JustifyText::Center));
        parent.spawn(TextBundle::from_section("Respawn (R)", text_style(40.0, Color::rgba(0.8, 0.8, 0.8, 1.0))).with_text_justify(JustifyText::Center));
    });
}

fn respawn_input(keys: Res<ButtonInput<KeyCode>>, mut sim: ResMut<Simulation>, mut next_app_state: ResMut<NextState<AppState>>) {
    if keys.just_pressed(KeyCode::KeyR) {
        sim.respawn();
        next_app_state.set(AppState::InGame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_has_autosave_interval() {
        let config = GameConfig::default();
        assert_eq!(config.autosave_interval, Duration::from_secs(30));
        assert_eq!(config.width, SCREEN_WIDTH);
    }
}
