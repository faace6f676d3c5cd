//! pcs-qs library interface
//!
//! Question synthesis for the physics-controllability study: discovers
//! matched video/image assets by filename token and emits randomized
//! forced-choice question banks.

pub mod error;
pub mod services;
pub mod synth;

pub use crate::error::{ScanError, SynthError};
pub use crate::synth::{synthesize, QuestionPolicy, SynthContext};
