//! # Store Errors
//!
//! Failures reported by document collections.

use thiserror::Error;

/// Result type for collection operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Collection engine errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Operator applied to a value of the wrong shape
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// Negative offset requested
    #[error("Skip must be non-negative, got {0}")]
    NegativeSkip(i64),

    /// Another document already has this `_id`
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Document is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A writer panicked while holding the collection lock
    #[error("Collection lock poisoned")]
    LockPoisoned,

    /// Reading or writing a snapshot file failed
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl EngineError {
    /// Whether the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidOperand(_)
                | EngineError::NegativeSkip(_)
                | EngineError::DuplicateId(_)
                | EngineError::InvalidDocument(_)
        )
    }
}
