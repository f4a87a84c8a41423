//! Manual / autonomous arbitration.

use contracts::{ControlMode, SessionState, VehicleCommand};
use tracing::{debug, info};

use crate::translator::TranslatedInput;

/// What the session loop must do this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickAction {
    /// Mode changed this tick: push the new autopilot flag to the controlled vehicle
    pub set_autonomous: Option<bool>,
    /// Command for the controlled vehicle; `None` while autonomous
    pub command: Option<VehicleCommand>,
}

/// Two-state machine over [`ControlMode`] plus the sticky reverse flag.
pub struct ControlArbiter;

impl ControlArbiter {
    /// Apply toggles to `state` and decide the tick's action.
    pub fn arbitrate(state: &mut SessionState, input: &TranslatedInput) -> TickAction {
        if input.reverse_toggled {
            state.reverse = !state.reverse;
            debug!(reverse = state.reverse, "reverse gear toggled");
        }

        let set_autonomous = input.mode_toggled.then(|| {
            state.mode = state.mode.toggled();
            info!(mode = ?state.mode, "control mode switched");
            state.mode.is_autonomous()
        });

        let command = match state.mode {
            ControlMode::Manual => Some(input.command.with_reverse(state.reverse)),
            ControlMode::Autonomous => None,
        };

        TickAction {
            set_autonomous,
            command,
        }
    }
}
