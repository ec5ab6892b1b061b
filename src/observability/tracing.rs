//! Tracing initialization and configuration.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use super::{LogFormat, ObservabilityError, ObservabilityResult};

/// Filter used when neither `RUST_LOG` nor the config names one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initializes the tracing subscriber for structured logging.
///
/// # Configuration
///
/// `RUST_LOG` takes precedence over `filter`. Either accepts the usual
/// directive syntax:
///
/// ```bash
/// RUST_LOG=debug rescue-api serve --config rescue.json
/// RUST_LOG=rescue_api=trace,tower_http=debug rescue-api serve --config rescue.json
/// ```
///
/// # Errors
///
/// Fails on an unparsable filter or when a global subscriber is already set.
pub fn init_tracing(format: LogFormat, filter: &str) -> ObservabilityResult<()> {
    let env_filter = create_env_filter(filter)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Pretty => registry.with(create_fmt_layer()).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init(),
    };

    result.map_err(|e| ObservabilityError::Init(e.to_string()))
}

/// Creates an environment filter for tracing.
fn create_env_filter(fallback: &str) -> ObservabilityResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| ObservabilityError::InvalidFilter(format!("{}: {}", fallback, e)))
}

/// Creates a human-readable tracing layer.
fn create_fmt_layer<S>() -> fmt::Layer<S> {
    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
}
