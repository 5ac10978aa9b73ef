use bevy::prelude::*;
use rand::Rng;

use crate::simulation::{Simulation, WORLD_SIZE};

const CAMERA_LERP_FACTOR: f32 = 0.1; // lower is softer
pub const DEFAULT_ZOOM: f32 = 1.0;
pub const MIN_ZOOM: f32 = 0.6;
pub const MAX_ZOOM: f32 = 1.5;
const ZOOM_STEP: f32 = 0.1;

#[derive(Component)]
pub struct MainCamera;

/// Camera zoom factor; 1.0 shows the world at native scale, larger values bring it closer.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraZoom(pub f32);

impl Default for CameraZoom {
    fn default() -> Self { Self(DEFAULT_ZOOM) }
}

impl CameraZoom {
    fn set(&mut self, value: f32) { self.0 = ((value * 10.0).round() / 10.0).clamp(MIN_ZOOM, MAX_ZOOM); }
    pub fn zoom_in(&mut self) { self.set(self.0 + ZOOM_STEP); }
    pub fn zoom_out(&mut self) { self.set(self.0 - ZOOM_STEP); }
    pub fn reset(&mut self) { self.0 = DEFAULT_ZOOM; }
}

/// World coordinates (origin bottom-left) to render coordinates (origin at the field centre).
pub fn world_to_render(position: Vec2) -> Vec2 { position - WORLD_SIZE / 2.0 }

pub struct CameraSystemsPlugin;

impl Plugin for CameraSystemsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraZoom>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, (zoom_keys, soft_camera_follow_system).chain());
    }
}

fn spawn_camera(mut commands: Commands) {
    let mut camera_bundle = Camera2dBundle::default();
    camera_bundle.transform.translation.z = 999.0;
    commands.spawn((camera_bundle, MainCamera));
}

fn zoom_keys(keys: Res<ButtonInput<KeyCode>>, mut zoom: ResMut<CameraZoom>) {
    if keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) { zoom.zoom_in(); }
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) { zoom.zoom_out(); }
    if keys.any_just_pressed([KeyCode::Digit0, KeyCode::Numpad0]) { zoom.reset(); }
}

fn soft_camera_follow_system(
    sim: Res<Simulation>,
    zoom: Res<CameraZoom>,
    mut camera_query: Query<(&mut Transform, &mut OrthographicProjection), With<MainCamera>>,
) {
    let Ok((mut camera_transform, mut projection)) = camera_query.get_single_mut() else { return };
    projection.scale = 1.0 / zoom.0;

    let target = world_to_render(sim.player.position).extend(camera_transform.translation.z);
    camera_transform.translation = camera_transform.translation.lerp(target, CAMERA_LERP_FACTOR);

    let shake = sim.effects.shake;
    if shake.is_active(sim.now) {
        let mut rng = rand::thread_rng();
        camera_transform.translation.x += rng.gen_range(-shake.intensity..=shake.intensity);
        camera_transform.translation.y += rng.gen_range(-shake.intensity..=shake.intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_steps_are_clamped_and_rounded() {
        let mut zoom = CameraZoom::default();
        for _ in 0..10 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.0, MAX_ZOOM);
        for _ in 0..3 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.0, 1.2);
        for _ in 0..20 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.0, MIN_ZOOM);
        zoom.reset();
        assert_eq!(zoom.0, 1.0);
    }
}
