//! Common error types for PCS

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for PCS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the PCS tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON decode error with the offending file attached
    #[error("Invalid JSON in {path}: {source}")]
    JsonFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// TOML config file could not be parsed
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested file or directory not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or record content
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
