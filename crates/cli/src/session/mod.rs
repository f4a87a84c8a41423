//! Session loop: connect, spawn, drive, tear down, retry.

mod error;
mod runner;
mod shutdown;
mod stats;

pub use error::SessionError;
pub use runner::{SessionPhase, SessionRunner};
pub use shutdown::ShutdownSignal;
pub use stats::RunStats;
