//! Key set → vehicle command.

use contracts::VehicleCommand;

use crate::input::Keys;

/// Output of one translation step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TranslatedInput {
    /// Raw command; `reverse` is always false here, the arbiter merges the sticky flag
    pub command: VehicleCommand,
    /// Reverse key pressed this tick (was up last tick)
    pub reverse_toggled: bool,
    /// Autopilot key pressed this tick (was up last tick)
    pub mode_toggled: bool,
}

/// Stateless apart from the previous key set used for edge detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTranslator {
    previous: Keys,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate the current key set.
    ///
    /// Left is evaluated before right, so holding both steers right.
    /// Throttle and brake are independent.
    pub fn translate(&mut self, pressed: Keys) -> TranslatedInput {
        let mut command = VehicleCommand::default();

        if pressed.intersects(Keys::STEER_LEFT) {
            command.steer = -1.0;
        }
        if pressed.intersects(Keys::STEER_RIGHT) {
            command.steer = 1.0;
        }
        if pressed.intersects(Keys::ACCELERATE) {
            command.throttle = 1.0;
        }
        if pressed.intersects(Keys::BRAKE) {
            command.brake = 1.0;
        }
        command.hand_brake = pressed.contains(Keys::SPACE);

        let newly_pressed = pressed.difference(self.previous);
        self.previous = pressed;

        TranslatedInput {
            command,
            reverse_toggled: newly_pressed.contains(Keys::Q),
            mode_toggled: newly_pressed.contains(Keys::P),
        }
    }

    /// Forget the previous key set (new session)
    pub fn reset(&mut self) {
        self.previous = Keys::empty();
    }
}
