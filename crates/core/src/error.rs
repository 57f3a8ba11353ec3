//! Error types for index construction and search.

use thiserror::Error;

/// Errors reported synchronously by index operations.
///
/// None of these are retried internally: each one signals caller misuse, and the
/// index is left exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HnswError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl HnswError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        HnswError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HnswError>;
