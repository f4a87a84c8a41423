//! # CARLA Drive
//!
//! 手动驾驶客户端核心。
//!
//! 提供：
//! - 配置解析与 CLI 覆盖 (`settings`)
//! - 会话生命周期与无限重试循环 (`session`)

pub mod session;
pub mod settings;

pub use session::{RunStats, SessionError, SessionPhase, SessionRunner, ShutdownSignal};
pub use settings::{resolve_config, Overrides};
