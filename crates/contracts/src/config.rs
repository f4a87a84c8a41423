//! DriveConfig - Config Loader 输出
//!
//! 描述完整的驾驶会话配置：服务器、会话策略、显示、两辆车、相机、落盘。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::{ControlMode, SensorType, Transform};

/// 完整的驾驶客户端配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// CARLA 服务器
    #[serde(default)]
    pub server: ServerConfig,

    /// 会话与重试策略
    #[serde(default)]
    pub session: SessionConfig,

    /// 显示窗口
    #[serde(default)]
    pub display: DisplayConfig,

    /// 受控车辆
    #[serde(default = "default_ego")]
    pub ego: VehicleSpec,

    /// 自动驾驶车辆
    #[serde(default = "default_npc")]
    pub npc: NpcSpec,

    /// 挂载在受控车辆上的相机
    #[serde(default)]
    pub camera: CameraSpec,

    /// 帧落盘
    #[serde(default)]
    pub recording: RecordingConfig,
}

impl DriveConfig {
    /// 会话开始时的控制模式
    pub fn initial_mode(&self) -> ControlMode {
        ControlMode::from_autopilot(self.session.autopilot)
    }

    /// 相机属性; 未显式配置图像尺寸时使用显示尺寸
    pub fn camera_attributes(&self) -> HashMap<String, String> {
        let mut attributes = self.camera.attributes.clone();
        attributes
            .entry("image_size_x".to_string())
            .or_insert_with(|| self.display.width.to_string());
        attributes
            .entry("image_size_y".to_string())
            .or_insert_with(|| self.display.height.to_string());
        attributes
    }
}

/// CARLA 服务器地址
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    2000
}

/// 会话策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 会话开始时是否启用 autopilot
    #[serde(default)]
    pub autopilot: bool,

    /// 会话失败后的固定重试间隔 (毫秒)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// 控制循环频率 (Hz)，取值范围见 [`SessionConfig::TICK_RATE_RANGE_HZ`]
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
}

impl SessionConfig {
    /// Accepted control loop rates
    pub const TICK_RATE_RANGE_HZ: std::ops::RangeInclusive<f64> = 0.1..=1000.0;

    const MIN_TICK: Duration = Duration::from_millis(1);
    const MAX_TICK: Duration = Duration::from_secs(10);

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Tick period, clamped to 1 ms ..= 10 s even for unvalidated rates
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.tick_rate_hz)
            .unwrap_or(Self::MAX_TICK)
            .clamp(Self::MIN_TICK, Self::MAX_TICK)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autopilot: false,
            retry_delay_ms: default_retry_delay_ms(),
            tick_rate_hz: default_tick_rate_hz(),
        }
    }
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_tick_rate_hz() -> f64 {
    60.0
}

/// 显示窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_title() -> String {
    "CARLA Manual Control".to_string()
}

/// 车辆配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    /// 固定蓝图名称; 为空时从 `blueprint_filter` 中随机选择
    #[serde(default)]
    pub blueprint: Option<String>,

    /// 蓝图过滤模式
    #[serde(default = "default_vehicle_filter")]
    pub blueprint_filter: String,

    /// 初始位姿
    #[serde(default = "default_ego_spawn")]
    pub spawn_point: Transform,
}

fn default_vehicle_filter() -> String {
    "vehicle".to_string()
}

fn default_ego_spawn() -> Transform {
    Transform::from_location(180.0, 199.0, 40.0)
}

fn default_npc_spawn() -> Transform {
    Transform::from_location(200.0, 199.0, 40.0)
}

fn default_ego() -> VehicleSpec {
    VehicleSpec {
        blueprint: None,
        blueprint_filter: default_vehicle_filter(),
        spawn_point: default_ego_spawn(),
    }
}

impl Default for VehicleSpec {
    fn default() -> Self {
        default_ego()
    }
}

/// 自动驾驶车辆配置
///
/// 反序列化经由 [`NpcFields`]，缺省的 `spawn_point` 取自动驾驶车辆自己的默认位姿。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NpcFields")]
pub struct NpcSpec {
    #[serde(flatten)]
    pub vehicle: VehicleSpec,

    /// 随机化的外观属性 (从推荐值中选取)
    #[serde(default = "default_randomize_attribute")]
    pub randomize_attribute: String,
}

fn default_randomize_attribute() -> String {
    "color".to_string()
}

/// `[npc]` 表的扁平形式
#[derive(Deserialize)]
struct NpcFields {
    #[serde(default)]
    blueprint: Option<String>,
    #[serde(default = "default_vehicle_filter")]
    blueprint_filter: String,
    #[serde(default = "default_npc_spawn")]
    spawn_point: Transform,
    #[serde(default = "default_randomize_attribute")]
    randomize_attribute: String,
}

impl From<NpcFields> for NpcSpec {
    fn from(fields: NpcFields) -> Self {
        Self {
            vehicle: VehicleSpec {
                blueprint: fields.blueprint,
                blueprint_filter: fields.blueprint_filter,
                spawn_point: fields.spawn_point,
            },
            randomize_attribute: fields.randomize_attribute,
        }
    }
}

fn default_npc() -> NpcSpec {
    NpcSpec {
        vehicle: VehicleSpec {
            spawn_point: default_npc_spawn(),
            ..default_ego()
        },
        randomize_attribute: default_randomize_attribute(),
    }
}

impl Default for NpcSpec {
    fn default() -> Self {
        default_npc()
    }
}

/// 相机配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    /// 相机类型
    #[serde(default)]
    pub sensor_type: SensorType,

    /// 相对于受控车辆的挂载位姿
    #[serde(default = "default_camera_transform")]
    pub transform: Transform,

    /// 传感器特定属性
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

fn default_camera_transform() -> Transform {
    Transform::from_location(0.5, 0.0, 1.40)
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            sensor_type: SensorType::Camera,
            transform: default_camera_transform(),
            attributes: HashMap::new(),
        }
    }
}

/// 帧落盘配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("_images")
}
