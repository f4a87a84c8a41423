//! SensorSource trait - Sensor data source abstraction
//!
//! Unified interface over real CARLA cameras and mock cameras, so the
//! lifecycle manager can subscribe either one to the display mailbox.

use std::sync::Arc;

use crate::{SensorPacket, SensorType};

/// Sensor data callback type
///
/// Invoked from the sensor's own delivery thread, never from the control loop.
/// Uses `Arc` so one callback can be shared by a source and its restarts.
pub type SensorDataCallback = Arc<dyn Fn(SensorPacket) + Send + Sync>;

/// Sensor data source trait
///
/// # Example
///
/// ```ignore
/// let sensor: Box<dyn SensorSource> =
///     client.get_sensor_source(actor_id, "camera".into(), SensorType::Camera)?;
/// sensor.listen(Arc::new(move |packet| mailbox.post_packet(packet)));
/// // ... drive ...
/// sensor.stop();
/// ```
pub trait SensorSource: Send + Sync {
    /// Get sensor ID
    fn sensor_id(&self) -> &str;

    /// Get sensor type
    fn sensor_type(&self) -> SensorType;

    /// Register data callback
    ///
    /// Repeated calls while already listening are ignored.
    fn listen(&self, callback: SensorDataCallback);

    /// Stop listening
    ///
    /// After this returns the callback is no longer invoked.
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
