//! Error types for a single session.

use actor_factory::ActorFactoryError;
use contracts::ActorRole;
use presenter::SurfaceError;
use thiserror::Error;

/// Anything that aborts the current session.
///
/// None of these end the process; the runner tears down and retries.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Connection, spawn or command failure
    #[error(transparent)]
    Actor(#[from] ActorFactoryError),

    /// Display failure
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Spawn reported success without registering an actor
    #[error("session has no {role} actor")]
    MissingActor { role: ActorRole },
}

impl SessionError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Actor(e) if e.is_connection() => "connection",
            Self::Actor(e) if e.is_spawn() => "spawn",
            Self::Actor(e) if e.is_command() => "command",
            Self::Actor(ActorFactoryError::CatalogUnavailable { .. }) => "catalog",
            Self::Actor(_) => "simulator",
            Self::Surface(_) => "surface",
            Self::MissingActor { .. } => "spawn",
        }
    }
}
