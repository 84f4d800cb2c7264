// Error types shared by every module of the library. The binary converts
// them into `anyhow::Error` at the edge.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifyError>;

#[derive(Error, Debug)]
pub enum ClassifyError {
    /// A required setting was neither passed nor entered at the prompt.
    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The prediction service answered with a non-success status.
    #[error("Prediction service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode prediction response: {0}")]
    Decode(String),

    #[error("Interactive prompt failed: {0}")]
    Prompt(String),
}

impl ClassifyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClassifyError::Io {
            path: path.into(),
            source,
        }
    }
}
