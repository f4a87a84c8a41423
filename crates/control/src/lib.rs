//! # Control
//!
//! 键盘输入 → 车辆控制命令。
//!
//! 负责：
//! - 每个 tick 采样按键集合 (`InputDevice`)
//! - 生成 `VehicleCommand` 和边沿触发的切换信号 (`InputTranslator`)
//! - 手动 / 自动驾驶仲裁 (`ControlArbiter`)
//!
//! ## 使用示例
//!
//! ```ignore
//! use control::{ControlArbiter, InputDevice, InputTranslator};
//!
//! let mut translator = InputTranslator::new();
//! let snapshot = device.poll();
//! let input = translator.translate(snapshot.pressed);
//! let action = ControlArbiter::arbitrate(&mut state, &input);
//! if let Some(command) = action.command {
//!     lifecycle.apply_command(controlled, &command).await?;
//! }
//! ```

mod arbiter;
mod input;
mod translator;

pub use arbiter::{ControlArbiter, TickAction};
pub use input::{IdleInput, InputDevice, InputSnapshot, Keys, ScriptedInput};
pub use translator::{InputTranslator, TranslatedInput};

// Re-export contracts types
pub use contracts::{ControlMode, SessionState, VehicleCommand};
