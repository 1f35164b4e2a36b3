//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a collector address for network transports
//! - Validate value ranges (intervals > 0, batch sizes within queue sizes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: config → Result<(), Vec<ValidationError>>
//! - Runs before any exporter or provider is created

use thiserror::Error;

use crate::config::schema::{
    ExporterConfig, LogBatchConfig, MetricReaderConfig, PipelineSettings, ServiceConfig,
    TelemetryConfig, TraceBatchConfig,
};
use crate::transport::ExporterKind;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("exporter `{kind}` requires a collector address")]
    MissingAddress { kind: ExporterKind },

    #[error("collector address `{address}` is not of the form host:port")]
    MalformedAddress { address: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} ({batch}) must not exceed the queue size ({queue})")]
    BatchExceedsQueue {
        field: &'static str,
        batch: usize,
        queue: usize,
    },

    #[error("service name must not be empty")]
    EmptyServiceName,
}

/// Validate the whole configuration file.
pub fn validate_config(config: &TelemetryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_service(&config.service, &mut errors);
    check_pipeline(&config.pipeline_settings(), &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only what the pipeline builders consume.
pub fn validate_pipeline(settings: &PipelineSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_pipeline(settings, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_service(service: &ServiceConfig, errors: &mut Vec<ValidationError>) {
    if service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }
}

fn check_pipeline(settings: &PipelineSettings, errors: &mut Vec<ValidationError>) {
    check_exporter(&settings.exporter, errors);
    check_traces(&settings.traces, errors);
    check_metrics(&settings.metrics, errors);
    check_logs(&settings.logs, errors);

    // A zero budget would abandon rollback teardown mid-flight.
    if settings.rollback_timeout.is_zero() {
        errors.push(ValidationError::NotPositive {
            field: "shutdown.timeout_ms",
        });
    }
}

fn check_exporter(exporter: &ExporterConfig, errors: &mut Vec<ValidationError>) {
    if exporter.kind.is_network() {
        let address = exporter.address.trim();
        if address.is_empty() {
            errors.push(ValidationError::MissingAddress {
                kind: exporter.kind,
            });
        } else if !is_host_port(address) {
            errors.push(ValidationError::MalformedAddress {
                address: exporter.address.clone(),
            });
        }
        if exporter.connect_timeout_ms == 0 {
            errors.push(ValidationError::NotPositive {
                field: "exporter.connect_timeout_ms",
            });
        }
    }

    if exporter.export_timeout_ms == 0 {
        errors.push(ValidationError::NotPositive {
            field: "exporter.export_timeout_ms",
        });
    }
}

fn check_traces(traces: &TraceBatchConfig, errors: &mut Vec<ValidationError>) {
    if traces.flush_interval_ms == 0 {
        errors.push(ValidationError::NotPositive {
            field: "traces.flush_interval_ms",
        });
    }
    check_batch(
        "traces.max_export_batch_size",
        traces.max_export_batch_size,
        traces.max_queue_size,
        errors,
    );
}

fn check_metrics(metrics: &MetricReaderConfig, errors: &mut Vec<ValidationError>) {
    if metrics.interval_ms == 0 {
        errors.push(ValidationError::NotPositive {
            field: "metrics.interval_ms",
        });
    }
}

fn check_logs(logs: &LogBatchConfig, errors: &mut Vec<ValidationError>) {
    if logs.flush_interval_ms == 0 {
        errors.push(ValidationError::NotPositive {
            field: "logs.flush_interval_ms",
        });
    }
    check_batch(
        "logs.max_export_batch_size",
        logs.max_export_batch_size,
        logs.max_queue_size,
        errors,
    );
}

fn check_batch(field: &'static str, batch: usize, queue: usize, errors: &mut Vec<ValidationError>) {
    if batch == 0 {
        errors.push(ValidationError::NotPositive { field });
    } else if batch > queue {
        errors.push(ValidationError::BatchExceedsQueue { field, batch, queue });
    }
}

/// `host:port` with a non-empty host and a numeric port. Bracketed IPv6 hosts
/// are accepted.
fn is_host_port(address: &str) -> bool {
    if address.contains("://") {
        return false;
    }
    match address.rsplit_once(':') {
        Some((host, port)) => {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            !host.is_empty() && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}
