//! # Query Errors
//!
//! Error types for turning raw request parameters into collection queries.

use thiserror::Error;

use crate::store::EngineError;

/// Result type for query pipeline operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query pipeline errors
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    // ==================
    // Parameter Errors
    // ==================
    /// The same parameter was given both as a value and as a bracketed map
    #[error("Conflicting shapes for query parameter: {0}")]
    ConflictingParameter(String),

    /// A field filter mixes comparison operators with plain keys
    #[error("Filter on '{0}' mixes comparison operators with plain fields")]
    MixedOperators(String),

    /// A comparison operator nested below the field level
    #[error("Operator '{operator}' is not allowed inside '{field}'")]
    MisplacedOperator { field: String, operator: String },

    /// Field names may not start with the engine operator sigil
    #[error("Invalid filter field: {0}")]
    ReservedFieldName(String),

    /// `select` mixes included and excluded fields
    #[error("Projection cannot mix inclusion and exclusion: {0}")]
    MixedProjection(String),

    // ==================
    // Engine Errors
    // ==================
    /// Failure reported by the underlying collection
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl QueryError {
    /// Whether the error was caused by the request rather than the engine
    pub fn is_client_error(&self) -> bool {
        match self {
            QueryError::Engine(e) => e.is_client_error(),
            _ => true,
        }
    }
}
