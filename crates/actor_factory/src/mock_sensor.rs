//! Mock camera implementation
//!
//! Implements `SensorSource` trait, generates BGRA test-pattern images.
//! Used for testing and development without CARLA environment.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{
    ImageData, ImageFormat, SensorDataCallback, SensorPacket, SensorPayload, SensorSource,
    SensorType,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Mock camera configuration
#[derive(Debug, Clone)]
pub struct MockSensorConfig {
    /// Send frequency (Hz); 0 disables the background thread, frames are then
    /// only produced through [`MockSensor::emit`]
    pub frequency_hz: f64,
    /// Image width
    pub image_width: u32,
    /// Image height
    pub image_height: u32,
}

impl Default for MockSensorConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 20.0,
            image_width: 800,
            image_height: 600,
        }
    }
}

struct Shared {
    sensor_id: String,
    sensor_type: SensorType,
    config: MockSensorConfig,
    listening: AtomicBool,
    /// 每次 listen / stop 递增；生成线程只在自己的代内运行
    generation: AtomicU64,
    active_generators: AtomicUsize,
    callback: Mutex<Option<SensorDataCallback>>,
    next_frame: AtomicU64,
    started: Instant,
}

/// Mock camera
///
/// Cheap to clone; clones share the same listening state, so the mock client
/// can keep one to stop the sensor when its actor is destroyed.
#[derive(Clone)]
pub struct MockSensor {
    shared: Arc<Shared>,
}

impl MockSensor {
    /// Create new mock camera
    pub fn new(sensor_id: String, sensor_type: SensorType, config: MockSensorConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                sensor_id,
                sensor_type,
                config,
                listening: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                active_generators: AtomicUsize::new(0),
                callback: Mutex::new(None),
                next_frame: AtomicU64::new(0),
                started: Instant::now(),
            }),
        }
    }

    /// Deliver a test-pattern frame to the registered callback.
    ///
    /// Returns false when the sensor is not listening.
    pub fn emit_test_pattern(&self) -> bool {
        let frame_id = self.shared.next_frame.load(Ordering::Relaxed) + 1;
        let image = test_pattern(
            self.shared.config.image_width,
            self.shared.config.image_height,
            frame_id,
        );
        self.emit(image)
    }

    /// Deliver an arbitrary image payload to the registered callback.
    ///
    /// Returns false when the sensor is not listening.
    pub fn emit(&self, image: ImageData) -> bool {
        Self::deliver(&self.shared, SensorPayload::Image(image))
    }

    /// Deliver a non-image payload (simulates a malformed delivery)
    pub fn emit_raw(&self, data: Bytes) -> bool {
        Self::deliver(&self.shared, SensorPayload::Raw(data))
    }

    fn deliver(shared: &Shared, payload: SensorPayload) -> bool {
        if !shared.listening.load(Ordering::Acquire) {
            return false;
        }
        let Some(callback) = shared.callback.lock().clone() else {
            return false;
        };

        let frame_id = shared.next_frame.fetch_add(1, Ordering::Relaxed) + 1;
        let packet = SensorPacket {
            sensor_id: shared.sensor_id.clone(),
            sensor_type: shared.sensor_type,
            timestamp: shared.started.elapsed().as_secs_f64(),
            frame_id: Some(frame_id),
            payload,
        };

        callback(packet);
        trace!(sensor_id = %shared.sensor_id, frame_id, "mock packet sent");
        true
    }

    /// Number of background generator threads still running
    pub fn active_generators(&self) -> usize {
        self.shared.active_generators.load(Ordering::Acquire)
    }

    fn spawn_generator(shared: Arc<Shared>, generation: u64) {
        let interval = Duration::from_secs_f64(1.0 / shared.config.frequency_hz);
        shared.active_generators.fetch_add(1, Ordering::AcqRel);

        thread::spawn(move || {
            debug!(
                sensor_id = %shared.sensor_id,
                frequency_hz = shared.config.frequency_hz,
                generation,
                "mock camera started"
            );

            while shared.listening.load(Ordering::Acquire)
                && shared.generation.load(Ordering::Acquire) == generation
            {
                let frame_id = shared.next_frame.load(Ordering::Relaxed) + 1;
                let image = test_pattern(
                    shared.config.image_width,
                    shared.config.image_height,
                    frame_id,
                );
                Self::deliver(&shared, SensorPayload::Image(image));
                thread::sleep(interval);
            }

            shared.active_generators.fetch_sub(1, Ordering::AcqRel);
            debug!(sensor_id = %shared.sensor_id, generation, "mock camera stopped");
        });
    }
}

impl SensorSource for MockSensor {
    fn sensor_id(&self) -> &str {
        &self.shared.sensor_id
    }

    fn sensor_type(&self) -> SensorType {
        self.shared.sensor_type
    }

    fn listen(&self, callback: SensorDataCallback) {
        // Idempotent: if already listening, don't start again
        if self.shared.listening.swap(true, Ordering::AcqRel) {
            return;
        }
        *self.shared.callback.lock() = Some(callback);
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;

        if self.shared.config.frequency_hz > 0.0 {
            Self::spawn_generator(self.shared.clone(), generation);
        }
    }

    fn stop(&self) {
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        self.shared.listening.store(false, Ordering::Release);
        self.shared.callback.lock().take();
    }

    fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::Acquire)
    }
}

/// BGRA gradient: blue follows x, green follows y, red follows the frame number.
pub fn test_pattern(width: u32, height: u32, frame_id: u64) -> ImageData {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let (b, g, r) = ((x % 256) as u8, (y % 256) as u8, (frame_id % 256) as u8);
            data.extend_from_slice(&[b, g, r, 255]);
        }
    }
    ImageData {
        width,
        height,
        format: ImageFormat::Bgra8,
        data: Bytes::from(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_camera() -> MockSensor {
        MockSensor::new(
            "test_camera".to_string(),
            SensorType::Camera,
            MockSensorConfig {
                frequency_hz: 0.0,
                image_width: 4,
                image_height: 2,
            },
        )
    }

    #[test]
    fn test_mock_sensor_background_thread() {
        let sensor = MockSensor::new(
            "test_camera".to_string(),
            SensorType::Camera,
            MockSensorConfig {
                frequency_hz: 100.0,
                image_width: 16,
                image_height: 8,
            },
        );

        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();

        sensor.listen(Arc::new(move |packet| {
            assert_eq!(packet.sensor_id, "test_camera");
            assert_eq!(packet.sensor_type, SensorType::Camera);
            count_clone.fetch_add(1, Ordering::Relaxed);
        }));

        thread::sleep(Duration::from_millis(50));
        sensor.stop();

        assert!(count.load(Ordering::Relaxed) > 0);
        assert!(!sensor.is_listening());
    }

    #[test]
    fn test_relisten_after_stop_runs_one_generator() {
        let sensor = MockSensor::new(
            "test_camera".to_string(),
            SensorType::Camera,
            MockSensorConfig {
                frequency_hz: 50.0,
                image_width: 4,
                image_height: 2,
            },
        );

        sensor.listen(Arc::new(|_| {}));
        sensor.stop();
        sensor.listen(Arc::new(|_| {}));

        // 旧线程最多再睡一个周期 (20ms) 就退出
        thread::sleep(Duration::from_millis(100));
        assert_eq!(sensor.active_generators(), 1);

        sensor.stop();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(sensor.active_generators(), 0);
    }

    #[test]
    fn test_emit_requires_listening() {
        let sensor = manual_camera();
        assert!(!sensor.emit_test_pattern());

        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();
        sensor.listen(Arc::new(move |packet| {
            assert_eq!(packet.frame_id, Some(1));
            count_clone.fetch_add(1, Ordering::Relaxed);
        }));

        assert!(sensor.emit_test_pattern());
        sensor.stop();
        assert!(!sensor.emit_test_pattern());
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_clone_shares_state() {
        let sensor = manual_camera();
        let handle = sensor.clone();
        sensor.listen(Arc::new(|_| {}));
        assert!(handle.is_listening());
        handle.stop();
        assert!(!sensor.is_listening());
    }

    #[test]
    fn test_mock_sensor_idempotent_listen() {
        let sensor = manual_camera();

        let count = Arc::new(AtomicU64::new(0));
        let count1 = count.clone();
        let count2 = count.clone();

        sensor.listen(Arc::new(move |_| {
            count1.fetch_add(1, Ordering::Relaxed);
        }));
        // Second call should be ignored
        sensor.listen(Arc::new(move |_| {
            count2.fetch_add(100, Ordering::Relaxed);
        }));

        sensor.emit_test_pattern();
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_pattern_layout() {
        let image = test_pattern(3, 2, 7);
        assert_eq!(Some(image.data.len()), image.expected_len());
        // pixel (x=2, y=1): row 1, column 2
        let offset = (3 + 2) * 4;
        assert_eq!(&image.data[offset..offset + 4], &[2, 1, 7, 255]);
    }
}
