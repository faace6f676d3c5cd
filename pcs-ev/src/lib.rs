//! pcs-ev library interface
//!
//! Evaluation side of the physics-controllability study: scores participant
//! responses per comparison type, rolls them up into field and table
//! metrics, and samples balanced per-participant question packs.

pub mod aggregator;
pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod report;
pub mod sampler;

pub use crate::aggregator::{aggregate, Aggregator, MetricsReport};
pub use crate::catalog::FieldCatalog;
pub use crate::error::EvalError;
pub use crate::evaluator::evaluate;
pub use crate::report::SummaryFormatter;
