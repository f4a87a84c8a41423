//! # Actor Factory
//!
//! CARLA actor lifecycle module.
//!
//! Responsibilities:
//! - Spawn the controlled vehicle, the autonomous vehicle and the attached camera
//! - Forward per-tick commands and autopilot switches
//! - Guarantee ordered teardown, including partially spawned sessions
//! - Provide unified `SensorSource` abstraction
//! - Support a mock simulator for tests and offline runs
//!
//! ## Feature Flags
//!
//! - `real-carla`: Enable real CARLA client (requires carla crate)

pub mod client;
pub mod error;
pub mod lifecycle;
pub mod mock_client;
pub mod mock_sensor;

#[cfg(feature = "real-carla")]
pub mod carla_camera;
#[cfg(feature = "real-carla")]
pub mod carla_client;

pub use client::CarlaClient;
pub use contracts::{ActorId, SensorSource, SessionState};
pub use error::{ActorFactoryError, Result};
pub use lifecycle::ActorLifecycle;
pub use mock_client::{default_catalog, MockCarlaClient, MockConfig};
pub use mock_sensor::{MockSensor, MockSensorConfig};

#[cfg(feature = "real-carla")]
pub use carla_client::RealCarlaClient;
#[cfg(feature = "real-carla")]
pub use carla_camera::CarlaCamera;
