use bevy::prelude::*;

use crate::game::AppState;
use crate::simulation::FrameInput;
use crate::skills::SkillSlot;

/// Input gathered between fixed steps. Presses latch until a step consumes them.
#[derive(Resource, Default)]
pub struct PendingInput(pub FrameInput);

impl PendingInput {
    /// Hands the accumulated frame to the simulation and clears the latched presses.
    pub fn take(&mut self) -> FrameInput {
        let frame = self.0;
        self.0 = FrameInput { movement: frame.movement, ..default() };
        frame
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingInput>()
            .add_systems(PreUpdate, gather_player_input.run_if(in_state(AppState::InGame)))
            .add_systems(OnExit(AppState::InGame), clear_pending_input);
    }
}

pub fn movement_from_keys(keys: &ButtonInput<KeyCode>) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) { direction.y += 1.0; }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) { direction.y -= 1.0; }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) { direction.x -= 1.0; }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) { direction.x += 1.0; }
    direction.normalize_or_zero()
}

fn skill_key(slot: SkillSlot) -> KeyCode {
    match slot {
        SkillSlot::Z => KeyCode::KeyZ,
        SkillSlot::X => KeyCode::KeyX,
        SkillSlot::C => KeyCode::KeyC,
    }
}

fn gather_player_input(keys: Res<ButtonInput<KeyCode>>, mut pending: ResMut<PendingInput>) {
    let input = &mut pending.0;
    input.movement = movement_from_keys(&keys);
    input.attack |= keys.just_pressed(KeyCode::KeyJ);
    input.dash |= keys.any_just_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    for slot in SkillSlot::ALL {
        input.skills[slot.index()] |= keys.just_pressed(skill_key(slot));
    }
}

fn clear_pending_input(mut pending: ResMut<PendingInput>) { pending.0 = FrameInput::default(); }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::KeyD);
        let direction = movement_from_keys(&keys);
        assert!((direction.length() - 1.0).abs() < 1e-6);
        assert!(direction.x > 0.0 && direction.y > 0.0);
    }

    #[test]
    fn take_clears_presses_but_keeps_movement() {
        let mut pending = PendingInput(FrameInput { movement: Vec2::X, attack: true, dash: true, skills: [true, false, true] });
        let frame = pending.take();
        assert!(frame.attack && frame.dash);
        assert_eq!(pending.0, FrameInput { movement: Vec2::X, ..default() });
    }
}
