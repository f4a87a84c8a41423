//! FrameDecoder
//!
//! 4 通道行优先图像 → 3 通道列优先 RGB [`Frame`]。

use contracts::{Frame, ImageData, ImageFormat, SensorPacket, SensorPayload};
use tracing::trace;

use crate::error::{DecodeError, Result};

const SOURCE_CHANNELS: usize = 4;

/// 解码一张相机图像
///
/// - 丢弃第 4 通道 (alpha)
/// - BGRA 反转为 RGB, RGBA 保持顺序
/// - 行优先转置为列优先, 与显示表面的方向一致
pub fn decode(image: &ImageData) -> Result<Frame> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    let expected = image
        .expected_len()
        .ok_or(DecodeError::DimensionsTooLarge { width, height })?;
    let actual = image.data.len();
    if actual != expected {
        return Err(DecodeError::LengthMismatch {
            width,
            height,
            expected,
            actual,
        });
    }

    let (w, h) = (width as usize, height as usize);
    let order: [usize; 3] = match image.format {
        ImageFormat::Bgra8 => [2, 1, 0],
        ImageFormat::Rgba8 => [0, 1, 2],
    };

    let mut pixels = vec![0u8; w * h * Frame::CHANNELS];
    for (row, line) in image.data.chunks_exact(w * SOURCE_CHANNELS).enumerate() {
        for (col, src) in line.chunks_exact(SOURCE_CHANNELS).enumerate() {
            let dst = (col * h + row) * Frame::CHANNELS;
            pixels[dst] = src[order[0]];
            pixels[dst + 1] = src[order[1]];
            pixels[dst + 2] = src[order[2]];
        }
    }

    trace!(width, height, format = ?image.format, "frame decoded");

    Frame::from_columns(width, height, pixels).ok_or(DecodeError::LengthMismatch {
        width,
        height,
        expected,
        actual,
    })
}

/// 解码一个传感器数据包
pub fn decode_packet(packet: &SensorPacket) -> Result<Frame> {
    match &packet.payload {
        SensorPayload::Image(image) => decode(image),
        SensorPayload::Raw(_) => Err(DecodeError::UnsupportedPayload {
            sensor_id: packet.sensor_id.clone(),
        }),
    }
}
