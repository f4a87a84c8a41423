//! Configuration resolution: file (optional) + CLI overrides + validation.

use std::path::{Path, PathBuf};

use config_loader::ConfigLoader;
use contracts::{ContractError, DriveConfig};
use tracing::info;

/// Values given on the command line; `None` keeps the file / default value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// `--autopilot` only ever turns autopilot on
    pub autopilot: bool,
    pub save_frames: Option<PathBuf>,
}

/// Load `config_path` (or defaults), apply `overrides`, validate.
pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<DriveConfig, ContractError> {
    let mut config = match config_path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)?
        }
        None => DriveConfig::default(),
    };

    if let Some(host) = &overrides.host {
        info!(host = %host, "Overriding CARLA host from CLI");
        config.server.host = host.clone();
    }
    if let Some(port) = overrides.port {
        info!(port, "Overriding CARLA port from CLI");
        config.server.port = port;
    }
    if overrides.autopilot {
        config.session.autopilot = true;
    }
    if let Some(dir) = &overrides.save_frames {
        config.recording.enabled = true;
        config.recording.output_dir = dir.clone();
    }

    ConfigLoader::validate(&config)?;
    Ok(config)
}
