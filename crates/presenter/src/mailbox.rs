//! FrameMailbox - single-slot handoff between the sensor thread and the render tick

use std::sync::Arc;

use contracts::{Frame, SensorDataCallback, SensorPacket};
use ingestion::{decode_packet, DecodeError};
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::metrics::MailboxMetrics;
use crate::recorder::FrameRecorder;

/// Single-slot frame mailbox
///
/// `post` replaces the slot in one step, `take` empties it in one step.
/// There is no queue: an unread frame is overwritten by the next one.
#[derive(Clone, Default)]
pub struct FrameMailbox {
    slot: Arc<Mutex<Option<Frame>>>,
    metrics: Arc<MailboxMetrics>,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`, dropping any unread one.
    ///
    /// Returns true if an unread frame was replaced.
    pub fn post(&self, frame: Frame) -> bool {
        let replaced = self.slot.lock().replace(frame).is_some();
        if replaced {
            self.metrics.inc_overwritten();
        }
        replaced
    }

    /// Take the latest frame, leaving the slot empty
    pub fn take(&self) -> Option<Frame> {
        let frame = self.slot.lock().take();
        if frame.is_some() {
            self.metrics.inc_taken();
        }
        frame
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }

    /// Drop any pending frame (session restart)
    pub fn clear(&self) {
        self.slot.lock().take();
    }

    pub fn metrics(&self) -> &Arc<MailboxMetrics> {
        &self.metrics
    }

    /// Decode a sensor packet and post it.
    ///
    /// A malformed packet leaves the mailbox untouched.
    pub fn post_packet(&self, packet: &SensorPacket) -> Result<(), DecodeError> {
        self.deliver(packet, None)
    }

    fn deliver(
        &self,
        packet: &SensorPacket,
        recorder: Option<&FrameRecorder>,
    ) -> Result<(), DecodeError> {
        self.metrics.inc_received();
        observability::record_frame_received(packet.sensor_type);

        let frame = match decode_packet(packet) {
            Ok(frame) => frame,
            Err(e) => {
                self.metrics.inc_decode_failed();
                observability::record_decode_failed(packet.sensor_type);
                trace!(sensor_id = %packet.sensor_id, error = %e, "frame dropped");
                return Err(e);
            }
        };

        if let Some(recorder) = recorder {
            match recorder.record(packet.frame_id, packet.sensor_type.tag(), &frame) {
                Ok(path) => {
                    self.metrics.inc_recorded();
                    trace!(path = %path.display(), "frame recorded");
                }
                Err(e) => {
                    self.metrics.inc_record_failed();
                    warn!(sensor_id = %packet.sensor_id, error = %e, "failed to record frame");
                }
            }
        }

        self.post(frame);
        Ok(())
    }

    /// Callback handed to the sensor source.
    ///
    /// Runs on the sensor's delivery thread; decoding, optional recording and
    /// the post all happen there.
    pub fn sensor_callback(&self, recorder: Option<Arc<FrameRecorder>>) -> SensorDataCallback {
        let mailbox = self.clone();
        Arc::new(move |packet: SensorPacket| {
            // 错误已计数，帧直接丢弃
            let _ = mailbox.deliver(&packet, recorder.as_deref());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{ImageData, ImageFormat, SensorPayload, SensorType};

    fn frame(value: u8) -> Frame {
        Frame::from_columns(1, 1, vec![value; 3]).unwrap()
    }

    fn packet(width: u32, height: u32, len: usize) -> SensorPacket {
        SensorPacket {
            sensor_id: "camera".into(),
            sensor_type: SensorType::Camera,
            timestamp: 0.0,
            frame_id: Some(7),
            payload: SensorPayload::Image(ImageData {
                width,
                height,
                format: ImageFormat::Bgra8,
                data: Bytes::from(vec![9u8; len]),
            }),
        }
    }

    #[test]
    fn test_post_overwrites_unread() {
        let mailbox = FrameMailbox::new();
        assert!(!mailbox.post(frame(1)));
        assert!(mailbox.post(frame(2)));

        assert_eq!(mailbox.take(), Some(frame(2)));
        assert!(mailbox.take().is_none());

        let snapshot = mailbox.metrics().snapshot();
        assert_eq!(snapshot.overwritten, 1);
        assert_eq!(snapshot.taken, 1);
    }

    #[test]
    fn test_clones_share_slot() {
        let writer = FrameMailbox::new();
        let reader = writer.clone();
        writer.post(frame(5));
        assert!(!reader.is_empty());
        reader.clear();
        assert!(writer.is_empty());
    }

    #[test]
    fn test_bad_packet_leaves_mailbox_untouched() {
        let mailbox = FrameMailbox::new();
        mailbox.post(frame(3));

        let err = mailbox.post_packet(&packet(2, 2, 15)).unwrap_err();
        assert!(matches!(err, DecodeError::LengthMismatch { .. }));
        assert_eq!(mailbox.take(), Some(frame(3)));

        let snapshot = mailbox.metrics().snapshot();
        assert_eq!(snapshot.received, 1);
        assert_eq!(snapshot.decode_failed, 1);
    }

    #[test]
    fn test_callback_posts_decoded_frame() {
        let mailbox = FrameMailbox::new();
        let callback = mailbox.sensor_callback(None);

        callback(packet(2, 3, 24));
        callback(packet(2, 3, 1));

        let frame = mailbox.take().unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 3));
        assert_eq!(frame.pixel(1, 2), Some([9, 9, 9]));
        assert_eq!(mailbox.metrics().snapshot().decode_failed, 1);
    }

    #[test]
    fn test_concurrent_posts_never_tear() {
        let mailbox = FrameMailbox::new();
        let writers: Vec<_> = (0..4u8)
            .map(|id| {
                let mailbox = mailbox.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        mailbox.post(Frame::from_columns(4, 4, vec![id; 48]).unwrap());
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            if let Some(frame) = mailbox.take() {
                let first = frame.as_bytes()[0];
                assert!(frame.as_bytes().iter().all(|b| *b == first));
            }
        }
        for writer in writers {
            writer.join().unwrap();
        }
    }
}
