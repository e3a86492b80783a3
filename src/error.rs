//! Error types for the pricing model
//!
//! Two classes only: configuration rejected before any computation starts,
//! and runtime data that indicates a defect in the caller. A constraint that
//! is not satisfied is a normal result, never an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed configuration (bad mix, zero tenure, invalid plan fields).
    /// Raised at the boundary, before simulation or checking begins.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid runtime data from an upstream producer (negative usage hours,
    /// out-of-range telemetry). Distinct from a failing constraint.
    #[error("invalid usage data: {0}")]
    InvalidUsage(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub fn config(msg: impl Into<String>) -> Self {
        ModelError::Config(msg.into())
    }

    pub fn invalid_usage(msg: impl Into<String>) -> Self {
        ModelError::InvalidUsage(msg.into())
    }
}
