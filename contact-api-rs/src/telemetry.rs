//! # Structured Logging
//!
//! Installs the global tracing subscriber for the service. Records emitted
//! through the `log` facade by the validation and config crates are forwarded
//! to the same subscriber.

use config_rs::{LogFormat, LoggingSettings};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

// Flag to track if logging has been initialized
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install global subscriber: {0}")]
    Init(String),
}

/// Initializes the structured logging system.
///
/// `RUST_LOG` takes precedence over the configured level. Later calls are
/// no-ops.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), TelemetryError> {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", settings.level)));

    // Exactly one of the two format layers is present
    let json_layer = (settings.format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true)
    });
    let text_layer = (settings.format == LogFormat::Text).then(|| fmt::layer().with_target(true));

    let result = Registry::default()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init();

    if let Err(e) = result {
        LOGGING_INITIALIZED.store(false, Ordering::SeqCst);
        return Err(TelemetryError::Init(e.to_string()));
    }

    tracing::info!(
        service = %settings.service_name,
        level = %settings.level,
        format = ?settings.format,
        "Logging initialized"
    );
    Ok(())
}
