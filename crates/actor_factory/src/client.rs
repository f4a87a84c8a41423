//! CARLA client abstraction
//!
//! Defines traits for interacting with CARLA, supporting real implementation and mock testing.
//! Every call is a fallible request with no internal retry; retrying is the session runner's job.

use std::future::Future;

use contracts::{ActorId, BlueprintInfo, SensorSource, SensorType, SpawnRequest, VehicleCommand};

use crate::error::Result;

/// CARLA client trait
///
/// Abstracts CARLA core operations for testing and future implementation replacement.
pub trait CarlaClient: Send + Sync {
    /// Connect to CARLA server
    fn connect(&mut self, host: &str, port: u16) -> impl Future<Output = Result<()>> + Send;

    /// List the blueprint library with attribute metadata
    fn blueprint_catalog(&self) -> impl Future<Output = Result<Vec<BlueprintInfo>>> + Send;

    /// Spawn actor
    ///
    /// When `request.attach_to` is set the transform is relative to that parent.
    ///
    /// # Returns
    /// Newly created actor ID
    fn spawn_actor(&self, request: &SpawnRequest) -> impl Future<Output = Result<ActorId>> + Send;

    /// Toggle server-side autopilot for a vehicle
    fn set_autopilot(
        &self,
        actor_id: ActorId,
        enabled: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Apply a control command to a vehicle
    ///
    /// Fails with `CommandFailed` when the actor no longer exists.
    fn apply_control(
        &self,
        actor_id: ActorId,
        command: &VehicleCommand,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Destroy actor
    ///
    /// Sensors are stopped before destruction.
    /// Idempotent operation: returns Ok if actor doesn't exist
    fn destroy_actor(&self, actor_id: ActorId) -> impl Future<Output = Result<()>> + Send;

    /// Get sensor data source
    ///
    /// # Arguments
    /// * `actor_id` - Sensor's actor ID
    /// * `sensor_id` - Name used for logging and packet tagging
    /// * `sensor_type` - Sensor type
    ///
    /// # Returns
    /// Boxed trait object implementing `SensorSource`, None if actor doesn't exist
    fn get_sensor_source(
        &self,
        actor_id: ActorId,
        sensor_id: String,
        sensor_type: SensorType,
    ) -> Option<Box<dyn SensorSource>>;
}
