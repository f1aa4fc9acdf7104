//! # Input State
//!
//! Per-tick input handed to the engine, and edge detection for the discrete
//! actions (jump, break, place, interact) so a held button fires once.

use cgmath::{Point3, Vector3};

use super::{actor_state::grid::GridDirection, voxels::block::BlockId};

/// Represents the state of a button across two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Button is not pressed
    #[default]
    NotPressed,
    /// Button was just pressed this tick
    Pressed,
    /// Button has been held down for multiple ticks
    Held,
    /// Button was just released this tick
    Released,
}

impl ButtonState {
    /// Determines if the button is down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Held)
    }

    /// Determines if the button was just pressed this tick
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, ButtonState::Pressed)
    }

    /// Determines if the button was just released this tick
    pub fn is_just_released(&self) -> bool {
        matches!(self, ButtonState::Released)
    }

    /// Derives the state from the previous and current raw levels
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => ButtonState::Pressed,
            (true, true) => ButtonState::Held,
            (true, false) => ButtonState::Released,
            (false, false) => ButtonState::NotPressed,
        }
    }
}

/// Raw input for one tick. Buttons are levels: `true` while held.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Forward axis in `[-1, 1]`.
    pub forward: f32,
    /// Right axis in `[-1, 1]`.
    pub strafe: f32,
    /// Sprint modifier.
    pub sprint: bool,
    /// Jump button.
    pub jump: bool,
    /// Break button.
    pub break_block: bool,
    /// Place button.
    pub place_block: bool,
    /// Interact button.
    pub interact: bool,
    /// Step request in grid control mode.
    pub grid_direction: Option<GridDirection>,
    /// Camera yaw and pitch deltas in radians.
    pub camera_rotate: (f32, f32),
    /// Camera distance delta.
    pub zoom: f32,
    /// Pointer ray in world space; the camera view ray when absent.
    pub pointer_ray: Option<(Point3<f32>, Vector3<f32>)>,
    /// Block to place; the configured default when absent.
    pub selected_block: Option<BlockId>,
}

/// Edge states of the discrete actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionButtons {
    /// Jump.
    pub jump: ButtonState,
    /// Break.
    pub break_block: ButtonState,
    /// Place.
    pub place_block: ButtonState,
    /// Interact.
    pub interact: ButtonState,
}

/// Remembers last tick's button levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    previous: [bool; 4],
}

impl InputTracker {
    /// Computes edge states and remembers the current levels.
    pub fn process(&mut self, input: &TickInput) -> ActionButtons {
        let current = [input.jump, input.break_block, input.place_block, input.interact];
        let [jump, break_block, place_block, interact] =
            std::array::from_fn(|i| ButtonState::from_raw_states(self.previous[i], current[i]));
        self.previous = current;
        ActionButtons {
            jump,
            break_block,
            place_block,
            interact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_buttons_fire_once() {
        let mut tracker = InputTracker::default();
        let held = TickInput {
            break_block: true,
            ..TickInput::default()
        };
        assert!(tracker.process(&held).break_block.is_just_pressed());
        assert_eq!(tracker.process(&held).break_block, ButtonState::Held);
        assert!(tracker.process(&TickInput::default()).break_block.is_just_released());
    }
}
