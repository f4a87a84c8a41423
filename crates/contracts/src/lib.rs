//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the drive client.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Ownership Model
//! - Actors live on the simulator; the client only holds opaque [`ActorId`]s
//! - A [`SessionState`] is owned by exactly one session and consumed by teardown
//! - A [`Frame`] moves from the sensor callback into the display mailbox

mod blueprint;
mod command;
mod config;
mod error;
mod frame;
mod runtime;
mod sensor;
mod sensor_source;

pub use blueprint::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use frame::Frame;
pub use runtime::*;
pub use sensor::*;
pub use sensor_source::{SensorDataCallback, SensorSource};
