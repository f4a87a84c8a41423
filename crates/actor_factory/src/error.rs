//! Actor Factory error types

use contracts::{ActorId, ActorRole};
use thiserror::Error;

/// Actor Factory specific error
#[derive(Debug, Error)]
pub enum ActorFactoryError {
    /// CARLA connection error (transport level)
    #[error("failed to connect to CARLA: {message}")]
    ConnectionFailed { message: String },

    /// Blueprint catalog could not be read
    #[error("failed to read blueprint catalog: {message}")]
    CatalogUnavailable { message: String },

    /// Simulator rejected a spawn request
    #[error("simulator rejected spawn of '{blueprint}': {message}")]
    SpawnRejected { blueprint: String, message: String },

    /// Session actor could not be created
    #[error("failed to spawn {role} actor '{blueprint}': {message}")]
    SpawnFailed {
        role: ActorRole,
        blueprint: String,
        message: String,
    },

    /// Command sent to a stale or unknown actor
    #[error("command rejected for {actor_id}: {message}")]
    CommandFailed { actor_id: ActorId, message: String },

    /// Destroy error
    #[error("failed to destroy {actor_id}: {message}")]
    DestroyFailed { actor_id: ActorId, message: String },
}

impl ActorFactoryError {
    /// Create connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create session spawn error
    pub fn spawn(
        role: ActorRole,
        blueprint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SpawnFailed {
            role,
            blueprint: blueprint.into(),
            message: message.into(),
        }
    }

    /// Create stale handle error
    pub fn stale_actor(actor_id: ActorId) -> Self {
        Self::CommandFailed {
            actor_id,
            message: "actor does not exist".into(),
        }
    }

    /// Transport-level failure
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    /// Spawn rejected or session actor missing
    pub fn is_spawn(&self) -> bool {
        matches!(self, Self::SpawnRejected { .. } | Self::SpawnFailed { .. })
    }

    /// Command sent to a stale handle
    pub fn is_command(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ActorFactoryError>;
