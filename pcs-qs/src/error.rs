//! Error types for pcs-qs
//!
//! Per-item sparsity (a missing counterpart, a missing diagram, a file
//! without a token) is logged and skipped and never surfaces here. These
//! errors are configuration-level and abort the run.

use pcs_common::Dataset;
use std::path::PathBuf;
use thiserror::Error;

/// Asset scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Question synthesis errors
#[derive(Debug, Error)]
pub enum SynthError {
    /// A directory the whole run depends on is missing
    #[error("Missing required directory: {0}")]
    MissingDirectory(PathBuf),

    /// Inputs produced no questions at all
    #[error("No {0} questions generated. Check your inputs.")]
    NoQuestions(Dataset),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Common(#[from] pcs_common::Error),
}
