//! Presenter error types

use thiserror::Error;

/// Display surface errors
///
/// Any of these aborts the running session.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Surface could not be created
    #[error("failed to open display surface: {message}")]
    Init { message: String },

    /// Present / swap failed
    #[error("failed to present frame: {message}")]
    Render { message: String },
}

impl SurfaceError {
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

/// Frame recording errors
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to create {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}
