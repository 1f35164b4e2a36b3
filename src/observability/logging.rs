//! Structured logging.
//!
//! # Responsibilities
//! - Install the process `tracing` subscriber
//! - Forward spans and log events into the bootstrapped pipelines
//!
//! # Design Decisions
//! - Console-only logging covers the window before the pipelines exist
//! - `RUST_LOG` wins over the configured level
//! - JSON format for production, pretty format for development
//! - Events from the exporters themselves never re-enter the pipeline

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use tracing::{Metadata, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};
use crate::lifecycle::Telemetry;

const INSTRUMENTATION_NAME: &str = env!("CARGO_PKG_NAME");

// Crates the exporters log through. Feeding them back would loop.
const EXPORTER_TARGETS: [&str; 6] = ["opentelemetry", "hyper", "tonic", "h2", "reqwest", "tower"];

/// Console-only subscriber for startup, before any pipeline exists.
///
/// Meant for [`tracing::subscriber::set_default`], so the global slot stays
/// free for [`init`].
pub fn console_subscriber(config: &LoggingConfig) -> impl Subscriber + Send + Sync {
    let (json, pretty) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(json)
        .with(pretty)
}

/// Install the global subscriber.
///
/// With `telemetry`, spans go to its tracer provider and events to its
/// logger provider in addition to the console.
pub fn init(config: &LoggingConfig, telemetry: Option<&Telemetry>) -> Result<(), TryInitError> {
    let (json, pretty) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer())),
    };

    let spans = telemetry.map(|t| {
        tracing_opentelemetry::layer()
            .with_tracer(t.tracer_provider().tracer(INSTRUMENTATION_NAME))
            .with_filter(filter_fn(is_application_event))
    });
    let events = telemetry.map(|t| {
        OpenTelemetryTracingBridge::new(t.logger_provider()).with_filter(filter_fn(is_application_event))
    });

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(json)
        .with(pretty)
        .with(spans)
        .with(events)
        .try_init()
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn is_application_event(metadata: &Metadata<'_>) -> bool {
    !is_exporter_target(metadata.target())
}

fn is_exporter_target(target: &str) -> bool {
    EXPORTER_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::") || rest.starts_with('_'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exporter_targets_are_excluded() {
        assert!(is_exporter_target("opentelemetry_sdk::trace"));
        assert!(is_exporter_target("opentelemetry"));
        assert!(is_exporter_target("hyper::proto::h1"));
        assert!(is_exporter_target("tonic::transport"));
        assert!(is_exporter_target("h2"));
        assert!(is_exporter_target("reqwest::blocking"));
    }

    #[test]
    fn test_application_targets_pass() {
        assert!(!is_exporter_target("telemetry_bootstrap::lifecycle"));
        assert!(!is_exporter_target("rolldice"));
        assert!(!is_exporter_target("hyperion"));
        assert!(!is_exporter_target("h2o"));
    }

    #[test]
    fn test_console_subscriber_covers_startup_warnings() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Json,
        };
        let _guard = tracing::subscriber::set_default(console_subscriber(&config));
        assert!(tracing::enabled!(tracing::Level::WARN));
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // Builds without panicking whatever RUST_LOG holds.
        let _ = env_filter("not a [valid directive");
    }
}
