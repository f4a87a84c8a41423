//! FrameRecorder - writes decoded frames to disk as PNG

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::Frame;
use tracing::{debug, instrument};

use crate::error::RecordError;

/// Writes one `{frame:06}_{tag}.png` file per frame
#[derive(Debug)]
pub struct FrameRecorder {
    output_dir: PathBuf,
    /// Index used when the packet carries no simulator frame number
    fallback_index: AtomicU64,
}

impl FrameRecorder {
    /// Create the recorder, creating `output_dir` if needed
    pub fn create(output_dir: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| RecordError::Io {
            path: output_dir.clone(),
            source,
        })?;
        debug!(output_dir = %output_dir.display(), "frame recorder ready");

        Ok(Self {
            output_dir,
            fallback_index: AtomicU64::new(0),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File path for a frame index and sensor tag
    pub fn path_for(&self, index: u64, tag: &str) -> PathBuf {
        self.output_dir.join(format!("{index:06}_{tag}.png"))
    }

    /// Save `frame` as an RGB PNG and return its path
    #[instrument(
        name = "frame_recorder_record",
        skip(self, frame),
        fields(frame_id = ?frame_id, tag = %tag)
    )]
    pub fn record(
        &self,
        frame_id: Option<u64>,
        tag: &str,
        frame: &Frame,
    ) -> Result<PathBuf, RecordError> {
        let index =
            frame_id.unwrap_or_else(|| self.fallback_index.fetch_add(1, Ordering::Relaxed));
        let path = self.path_for(index, tag);

        image::save_buffer(
            &path,
            &to_row_major(frame),
            frame.width(),
            frame.height(),
            image::ColorType::Rgb8,
        )?;
        Ok(path)
    }
}

/// Column-major frame bytes → row-major RGB
fn to_row_major(frame: &Frame) -> Vec<u8> {
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    let src = frame.as_bytes();
    let mut out = vec![0u8; src.len()];
    for x in 0..w {
        for y in 0..h {
            let from = (x * h + y) * Frame::CHANNELS;
            let to = (y * w + x) * Frame::CHANNELS;
            out[to..to + Frame::CHANNELS].copy_from_slice(&src[from..from + Frame::CHANNELS]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// 2x1: 左红 右蓝
    fn red_blue() -> Frame {
        Frame::from_columns(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap()
    }

    #[test]
    fn test_path_naming() {
        let dir = tempdir().unwrap();
        let recorder = FrameRecorder::create(dir.path()).unwrap();
        assert_eq!(
            recorder.path_for(42, "camera"),
            dir.path().join("000042_camera.png")
        );
    }

    #[test]
    fn test_record_writes_png() {
        let dir = tempdir().unwrap();
        let recorder = FrameRecorder::create(dir.path().join("nested")).unwrap();

        let path = recorder.record(Some(3), "depth", &red_blue()).unwrap();
        assert!(path.ends_with("000003_depth.png"));

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_create_under_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let err = FrameRecorder::create(blocker.join("frames")).unwrap_err();
        assert!(matches!(err, RecordError::Io { ref path, .. } if path.ends_with("frames")));
        assert!(err.to_string().contains("blocker"));
    }

    #[test]
    fn test_fallback_index_is_monotonic() {
        let dir = tempdir().unwrap();
        let recorder = FrameRecorder::create(dir.path()).unwrap();

        let first = recorder.record(None, "camera", &red_blue()).unwrap();
        let second = recorder.record(None, "camera", &red_blue()).unwrap();
        assert!(first.ends_with("000000_camera.png"));
        assert!(second.ends_with("000001_camera.png"));
    }

    #[test]
    fn test_row_major_conversion() {
        // 1x2 列: 上绿 下白
        let frame = Frame::from_columns(1, 2, vec![0, 255, 0, 255, 255, 255]).unwrap();
        assert_eq!(to_row_major(&frame), vec![0, 255, 0, 255, 255, 255]);

        // 2x2
        let frame = Frame::from_columns(2, 2, (0..12).collect()).unwrap();
        // (0,0)=0..3 (0,1)=3..6 (1,0)=6..9 (1,1)=9..12
        assert_eq!(
            to_row_major(&frame),
            vec![0, 1, 2, 6, 7, 8, 3, 4, 5, 9, 10, 11]
        );
    }
}
