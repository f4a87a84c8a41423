//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use carla_drive::Overrides;

/// CARLA Drive - manual driving client for the CARLA simulator
#[derive(Parser, Debug)]
#[command(
    name = "carla-drive",
    author,
    version,
    about = "Drive a CARLA vehicle from the keyboard",
    long_about = "Connects to CARLA, spawns a controlled vehicle, an autopilot vehicle and a \n\
                  camera, and shows the camera feed while forwarding keyboard input.\n\n\
                  Keys: WASD / arrows drive, Space hand brake, Q reverse, P autopilot, Esc quit."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "CARLA_DRIVE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        env = "CARLA_DRIVE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "CARLA_DRIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// IP of the host server
    #[arg(long, env = "CARLA_DRIVE_HOST")]
    pub host: Option<String>,

    /// TCP port to listen to
    #[arg(short, long, env = "CARLA_DRIVE_PORT")]
    pub port: Option<u16>,

    /// Start with the autopilot engaged
    #[arg(short, long)]
    pub autopilot: bool,

    /// Save every camera frame as PNG into this directory
    #[arg(long, env = "CARLA_DRIVE_SAVE_FRAMES")]
    pub save_frames: Option<PathBuf>,

    /// Render without opening a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many control ticks (0 = unlimited)
    #[arg(long, default_value = "0", env = "CARLA_DRIVE_MAX_TICKS")]
    pub max_ticks: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "CARLA_DRIVE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without connecting
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            autopilot: self.autopilot,
            save_frames: self.save_frames.clone(),
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
