//! Core error types for `wwpoints`.

use thiserror::Error;

/// Core error type for `wwpoints` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Region code is not one of the supported regions.
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    /// Invalid account configuration.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
