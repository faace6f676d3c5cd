//! Asset discovery services
//!
//! - `token_parser`: filename token extraction and canonical keys
//! - `asset_scanner`: sorted, single-level directory listing by asset kind
//! - `pairing`: bucketing scanned assets into level pairs and angle sets

pub mod asset_scanner;
pub mod pairing;
pub mod token_parser;
