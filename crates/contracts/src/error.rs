//! 配置错误
//!
//! 运行期错误由各自的 crate 定义（actor_factory / ingestion / presenter）。

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, validating or rendering a [`crate::DriveConfig`]
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension other than `.toml` / `.json`
    #[error("unsupported config format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("config serialize error: {message}")]
    ConfigSerialize { message: String },
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field path of a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ConfigValidation { field, .. } => Some(field),
            _ => None,
        }
    }
}
