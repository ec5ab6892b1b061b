//! # Observability
//!
//! Log output for the server and CLI. Code emits events with the `tracing`
//! macros; this module only installs the subscriber that prints them.

mod tracing;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::tracing::{init_tracing, DEFAULT_LOG_FILTER};

/// Result type for observability setup
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

/// Subscriber setup errors
#[derive(Debug, Clone, Error)]
pub enum ObservabilityError {
    #[error("Invalid log filter {0}")]
    InvalidFilter(String),

    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one event per line
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}
