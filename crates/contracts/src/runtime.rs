//! SessionState - Actor Lifecycle output
//!
//! Runtime actor handles and per-session control state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ControlMode;

/// Opaque handle of a simulator-owned actor.
///
/// This is a back-reference into server state, not an owned resource:
/// dropping it does nothing, destruction goes through the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(u32);

impl ActorId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for ActorId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor_{}", self.0)
    }
}

/// Role an actor plays inside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Vehicle driven by local input or its own autopilot
    Controlled,
    /// Second vehicle that is always on autopilot
    Autonomous,
    /// Camera attached to the controlled vehicle
    Sensor,
}

impl ActorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Controlled => "controlled",
            Self::Autonomous => "autonomous",
            Self::Sensor => "sensor",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session state
///
/// Handles stay `None` until the corresponding spawn succeeds.
/// `reverse` persists across ticks independently of `mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub controlled: Option<ActorId>,
    pub autonomous: Option<ActorId>,
    pub sensor: Option<ActorId>,
    pub reverse: bool,
    pub mode: ControlMode,
}

impl SessionState {
    /// Empty session starting in `mode`
    pub fn new(mode: ControlMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Handle registered for `role`, if spawned
    pub fn handle(&self, role: ActorRole) -> Option<ActorId> {
        match role {
            ActorRole::Controlled => self.controlled,
            ActorRole::Autonomous => self.autonomous,
            ActorRole::Sensor => self.sensor,
        }
    }

    /// Register a freshly spawned actor
    pub fn register(&mut self, role: ActorRole, actor_id: ActorId) {
        let slot = match role {
            ActorRole::Controlled => &mut self.controlled,
            ActorRole::Autonomous => &mut self.autonomous,
            ActorRole::Sensor => &mut self.sensor,
        };
        *slot = Some(actor_id);
    }

    /// True once all three actors exist
    pub fn is_complete(&self) -> bool {
        self.controlled.is_some() && self.autonomous.is_some() && self.sensor.is_some()
    }

    /// Spawned handles in teardown order: sensor, controlled, autonomous
    pub fn teardown_order(&self) -> Vec<(ActorRole, ActorId)> {
        [ActorRole::Sensor, ActorRole::Controlled, ActorRole::Autonomous]
            .into_iter()
            .filter_map(|role| self.handle(role).map(|id| (role, id)))
            .collect()
    }
}
