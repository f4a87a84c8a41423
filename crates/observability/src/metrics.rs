//! 驾驶会话指标
//!
//! 基于 `metrics` facade 记录帧、控制命令和会话重试。
//! 未安装 recorder 时所有调用都是 no-op。

use std::time::Duration;

use contracts::{ControlMode, SensorType};
use metrics::{counter, gauge, histogram};

/// 记录一帧传感器数据到达
pub fn record_frame_received(sensor_type: SensorType) {
    counter!(
        "carla_drive_frames_received_total",
        "sensor_type" => sensor_type.tag()
    )
    .increment(1);
}

/// 记录一帧解码失败 (帧被丢弃)
pub fn record_decode_failed(sensor_type: SensorType) {
    counter!(
        "carla_drive_frames_decode_failed_total",
        "sensor_type" => sensor_type.tag()
    )
    .increment(1);
}

/// 记录一帧被呈现到屏幕
pub fn record_frame_presented() {
    counter!("carla_drive_frames_presented_total").increment(1);
}

/// 记录一条控制命令被发送到受控车辆
pub fn record_command_applied() {
    counter!("carla_drive_commands_applied_total").increment(1);
}

/// 记录会话启动成功
pub fn record_session_started() {
    counter!("carla_drive_sessions_started_total").increment(1);
    gauge!("carla_drive_session_active").set(1.0);
}

/// 记录会话中止并进入重试
pub fn record_session_retry(reason: &'static str) {
    counter!("carla_drive_session_retries_total", "reason" => reason).increment(1);
    gauge!("carla_drive_session_active").set(0.0);
}

/// 记录控制模式切换
pub fn record_mode_switch(mode: ControlMode) {
    let mode = if mode.is_autonomous() {
        "autonomous"
    } else {
        "manual"
    };
    counter!("carla_drive_mode_switches_total", "mode" => mode).increment(1);
}

/// 记录单个 tick 的耗时
pub fn record_tick_duration(elapsed: Duration) {
    histogram!("carla_drive_tick_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}

/// 统计摘要
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_empty_summary_display() {
        assert_eq!(RunningStats::default().summary().to_string(), "N/A");
    }

    #[test]
    fn test_summary_display() {
        let mut stats = RunningStats::default();
        stats.push(16.0);
        stats.push(18.0);
        let output = stats.summary().to_string();
        assert!(output.contains("mean=17.000"));
        assert!(output.contains("(n=2)"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_frame_received(SensorType::Camera);
        record_decode_failed(SensorType::Depth);
        record_mode_switch(ControlMode::Autonomous);
        record_tick_duration(Duration::from_millis(16));
    }
}
