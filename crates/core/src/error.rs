//! Error types for the apkschema pipeline

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{what} not found at: {}", path.display())]
    MissingInput { what: String, path: PathBuf },

    #[error("Process error: {0}")]
    Process(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn missing_input(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingInput {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn process(msg: impl Into<String>) -> Self {
        Self::Process(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    /// Whether this error came from a missing required input
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

/// Fail with [`Error::MissingInput`] unless `path` exists
pub fn require_exists(what: &str, path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::missing_input(what, path))
    }
}
