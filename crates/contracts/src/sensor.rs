//! SensorPacket - 传感器回调输出
//!
//! 原始传感器数据包结构。

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 传感器数据包
///
/// 从 CARLA 传感器回调接收的原始数据。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorPacket {
    /// 传感器 ID
    pub sensor_id: String,

    /// 传感器类型
    pub sensor_type: SensorType,

    /// CARLA 仿真时间戳 (seconds, f64)
    pub timestamp: f64,

    /// 可选的帧序号 (用于落盘文件名/诊断)
    pub frame_id: Option<u64>,

    /// 数据载荷 (零拷贝)
    pub payload: SensorPayload,
}

/// 传感器数据载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SensorPayload {
    /// 图像数据
    Image(ImageData),

    /// 原始字节 (fallback)
    Raw(Bytes),
}

/// 图像数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// 图像宽度
    pub width: u32,

    /// 图像高度
    pub height: u32,

    /// 像素格式
    pub format: ImageFormat,

    /// 原始像素数据, 行优先, 每像素 4 字节
    pub data: Bytes,
}

impl ImageData {
    /// 按宽高计算的期望字节数; 溢出 usize 时为 `None`
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }
}

/// 图像格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    /// CARLA 相机原生格式
    Bgra8,
    Rgba8,
}

/// 传感器类型 (均为 4 通道图像输出的相机)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    #[default]
    Camera,
    Depth,
    SemanticSegmentation,
}

impl SensorType {
    /// 对应的 CARLA 蓝图名称
    pub fn blueprint(self) -> &'static str {
        match self {
            Self::Camera => "sensor.camera.rgb",
            Self::Depth => "sensor.camera.depth",
            Self::SemanticSegmentation => "sensor.camera.semantic_segmentation",
        }
    }

    /// 从蓝图名称推断类型
    pub fn from_blueprint(blueprint: &str) -> Option<Self> {
        [Self::Camera, Self::Depth, Self::SemanticSegmentation]
            .into_iter()
            .find(|kind| kind.blueprint() == blueprint)
    }

    /// 文件名中使用的短标签
    pub fn tag(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Depth => "depth",
            Self::SemanticSegmentation => "semantic_segmentation",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
