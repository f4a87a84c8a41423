//! # Ingestion
//!
//! Sensor payload decoding.
//!
//! Responsibilities:
//! - Validate raw camera payloads (dimensions, buffer length)
//! - Convert 4-channel row-major images into display-ready [`Frame`]s
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::decode_packet;
//!
//! match decode_packet(&packet) {
//!     Ok(frame) => mailbox.post(frame),
//!     Err(e) => tracing::trace!(error = %e, "frame dropped"),
//! }
//! ```

mod decoder;
mod error;

pub use contracts::{Frame, SensorPacket};
pub use decoder::{decode, decode_packet};
pub use error::{DecodeError, Result};
