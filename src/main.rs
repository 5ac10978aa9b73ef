use bevy::prelude::*;

use devil_fruit_arena::camera_systems::CameraSystemsPlugin;
use devil_fruit_arena::game::{GamePlugin, SCREEN_HEIGHT, SCREEN_WIDTH};
use devil_fruit_arena::input::InputPlugin;
use devil_fruit_arena::persistence::PersistencePlugin;
use devil_fruit_arena::visual_effects::VisualEffectsPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Devil Fruit Arena".into(),
                resolution: (SCREEN_WIDTH, SCREEN_HEIGHT).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            GamePlugin,
            InputPlugin,
            PersistencePlugin,
            CameraSystemsPlugin,
            VisualEffectsPlugin,
        ))
        .run();
}
