//! Vehicle command and control mode.

use serde::{Deserialize, Serialize};

/// Actor-level control command sent to the controlled vehicle once per tick.
///
/// `Default` is the all-zero, forward-gear command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleCommand {
    /// Steering in `[-1, 1]`, negative is left
    pub steer: f32,
    /// Throttle in `[0, 1]`
    pub throttle: f32,
    /// Brake in `[0, 1]`
    pub brake: f32,
    pub hand_brake: bool,
    pub reverse: bool,
}

impl VehicleCommand {
    /// Copy of this command with the reverse gear set to `reverse`.
    pub fn with_reverse(self, reverse: bool) -> Self {
        Self { reverse, ..self }
    }

    /// True when every axis lies in its documented range.
    pub fn is_within_limits(&self) -> bool {
        (-1.0..=1.0).contains(&self.steer)
            && (0.0..=1.0).contains(&self.throttle)
            && (0.0..=1.0).contains(&self.brake)
    }
}

/// Who drives the controlled vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Local input is applied every tick
    #[default]
    Manual,
    /// The simulator's autopilot drives; local input is suppressed
    Autonomous,
}

impl ControlMode {
    pub fn from_autopilot(enabled: bool) -> Self {
        if enabled {
            Self::Autonomous
        } else {
            Self::Manual
        }
    }

    pub fn is_autonomous(self) -> bool {
        self == Self::Autonomous
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Manual => Self::Autonomous,
            Self::Autonomous => Self::Manual,
        }
    }
}
