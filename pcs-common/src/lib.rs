//! # PCS Common Library
//!
//! Shared code for the physics-controllability study tools including:
//! - Question, field, and response record types
//! - Configuration loading and resolution
//! - Logging initialization
//! - Display labels, slugs, and question id construction
//! - Seeded randomness and atomic JSON output
//! - Field filter matching (shared by pack sampling and metrics)

pub mod config;
pub mod error;
pub mod filters;
pub mod json_io;
pub mod labels;
pub mod logging;
pub mod rng;
pub mod schema;

pub use error::{Error, Result};
pub use schema::{Dataset, Field, Level, Question, Response};
