//! # Presenter
//!
//! 相机画面显示模块。
//!
//! 负责：
//! - 单槽 mailbox：传感器线程写入，控制循环读取
//! - 每个 tick 把最新帧 blit 到后缓冲并呈现
//! - 可选：把每一帧保存为 PNG
//!
//! ## Feature Flags
//!
//! - `window`: 启用 winit + pixels 窗口 (`WindowSurface`)

pub mod error;
pub mod mailbox;
pub mod metrics;
pub mod presenter;
pub mod recorder;
pub mod surface;

#[cfg(feature = "window")]
pub mod window;

pub use contracts::Frame;
pub use error::{RecordError, SurfaceError};
pub use mailbox::FrameMailbox;
pub use metrics::{MailboxMetrics, MetricsSnapshot};
pub use presenter::DisplayPresenter;
pub use recorder::FrameRecorder;
pub use surface::{HeadlessSurface, Surface};

#[cfg(feature = "window")]
pub use window::{WindowInput, WindowSurface};
