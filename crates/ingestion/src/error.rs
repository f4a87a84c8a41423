//! Ingestion 错误类型

use thiserror::Error;

/// 帧解码错误
///
/// 单帧错误只会导致该帧被丢弃，不会中止会话。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// 缓冲区长度与 width × height × 4 不一致
    #[error("payload length {actual} does not match {width}x{height}x4 = {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// width × height × 4 超出可寻址范围
    #[error("image dimensions {width}x{height} are too large")]
    DimensionsTooLarge { width: u32, height: u32 },

    /// 宽或高为 0
    #[error("image has zero dimension ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// 不是图像载荷
    #[error("sensor {sensor_id} delivered a non-image payload")]
    UnsupportedPayload { sensor_id: String },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, DecodeError>;
