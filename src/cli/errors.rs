//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit.

use std::fmt;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Logging could not be set up
    LoggingFailed,
    /// Seeding or server start failed
    BootFailed,
    /// Resource name not served
    UnknownResource,
    /// Query string rejected
    InvalidQuery,
    /// Export could not be written
    ExportFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RESCUE_CLI_CONFIG_ERROR",
            Self::LoggingFailed => "RESCUE_CLI_LOGGING_FAILED",
            Self::BootFailed => "RESCUE_CLI_BOOT_FAILED",
            Self::UnknownResource => "RESCUE_CLI_UNKNOWN_RESOURCE",
            Self::InvalidQuery => "RESCUE_CLI_INVALID_QUERY",
            Self::ExportFailed => "RESCUE_CLI_EXPORT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn logging_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::LoggingFailed, msg)
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn unknown_resource(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::UnknownResource, msg)
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidQuery, msg)
    }

    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ExportFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
