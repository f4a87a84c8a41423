//! CARLA 相机 → `SensorSource`
//!
//! 仅在 `real-carla` feature 启用时编译。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use carla::client::Sensor;
use carla::sensor::data::Image;
use carla::sensor::{SensorData, SensorDataBase};
use contracts::{
    ImageData, ImageFormat, SensorDataCallback, SensorPacket, SensorPayload, SensorSource,
    SensorType,
};
use tracing::{debug, trace};

/// Camera attached to the controlled vehicle.
///
/// rgb / depth / semantic segmentation all deliver BGRA images; anything else
/// coming out of the sensor is dropped.
pub struct CarlaCamera {
    sensor: Sensor,
    tap: Arc<Tap>,
}

/// State shared with the simulator callback thread
struct Tap {
    sensor_id: String,
    sensor_type: SensorType,
    active: AtomicBool,
}

impl Tap {
    fn packet(&self, data: &SensorData) -> Option<SensorPacket> {
        let timestamp = data.timestamp();
        let frame_id = data.frame() as u64;
        let image = Image::try_from(data.clone()).ok()?;

        Some(SensorPacket {
            sensor_id: self.sensor_id.clone(),
            sensor_type: self.sensor_type,
            timestamp,
            frame_id: Some(frame_id),
            payload: SensorPayload::Image(ImageData {
                width: image.width() as u32,
                height: image.height() as u32,
                format: ImageFormat::Bgra8,
                data: Bytes::copy_from_slice(image.as_raw_bytes()),
            }),
        })
    }
}

impl CarlaCamera {
    pub fn new(sensor_id: String, sensor_type: SensorType, sensor: Sensor) -> Self {
        Self {
            sensor,
            tap: Arc::new(Tap {
                sensor_id,
                sensor_type,
                active: AtomicBool::new(false),
            }),
        }
    }
}

impl SensorSource for CarlaCamera {
    fn sensor_id(&self) -> &str {
        &self.tap.sensor_id
    }

    fn sensor_type(&self) -> SensorType {
        self.tap.sensor_type
    }

    fn listen(&self, callback: SensorDataCallback) {
        if self.tap.active.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(
            sensor_id = %self.tap.sensor_id,
            blueprint = self.tap.sensor_type.blueprint(),
            "camera listening"
        );

        let tap = self.tap.clone();
        self.sensor.listen(move |data| {
            // stop() 之后模拟器仍可能回调一次
            if !tap.active.load(Ordering::Acquire) {
                return;
            }
            match tap.packet(&data) {
                Some(packet) => callback(packet),
                None => trace!(sensor_id = %tap.sensor_id, "non-image sensor data dropped"),
            }
        });
    }

    fn stop(&self) {
        if self.tap.active.swap(false, Ordering::AcqRel) {
            self.sensor.stop();
            debug!(sensor_id = %self.tap.sensor_id, "camera stopped");
        }
    }

    fn is_listening(&self) -> bool {
        self.tap.active.load(Ordering::Acquire)
    }
}
