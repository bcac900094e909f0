//! Error types (v0.1)
//!
//! Coded errors in the TETHER-0xx range. Only configuration mistakes are
//! errors: an endpoint path that cannot be resolved yet is represented as
//! data (`None`) and retried lazily, and a fault travelling through a
//! transform pipeline is a value, not an `Err` return.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TetherError {
    #[error("TETHER-001: cannot connect binding: no from-path configured")]
    MissingFromPath,

    #[error("TETHER-002: cannot connect binding: no to-path configured")]
    MissingToPath,

    #[error("TETHER-010: invalid property path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}
