//! Error types for pcs-ev
//!
//! A response that cannot be resolved or parsed is skipped with a log line
//! and never reaches these types. Everything here aborts the run before
//! any output is written.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// Response file is neither `{"responses": [...]}` nor a bare array
    #[error("{0} is not a valid response bundle")]
    MalformedBundle(PathBuf),

    #[error("Unknown dataset '{name}'. Available: {available}")]
    UnknownDataset { name: String, available: String },

    #[error("Dataset {dataset} missing at {path}")]
    MissingBank { dataset: String, path: PathBuf },

    #[error("Not enough questions for field '{field}' (wanted {wanted}, found {found})")]
    InsufficientPool {
        field: String,
        wanted: usize,
        found: usize,
    },

    #[error("Duplicate field id '{0}' in field catalog")]
    DuplicateField(String),

    #[error("Provide --participants ... or --count N to generate packs")]
    NoParticipants,

    #[error(transparent)]
    Common(#[from] pcs_common::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
