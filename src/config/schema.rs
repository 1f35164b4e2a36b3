//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the telemetry
//! bootstrap. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::transport::ExporterKind;

/// Root configuration for the telemetry bootstrap.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service identity used to build the resource descriptor.
    pub service: ServiceConfig,

    /// Transport selection shared by all three signal kinds.
    pub exporter: ExporterConfig,

    /// Span batching.
    pub traces: TraceBatchConfig,

    /// Metric collection.
    pub metrics: MetricReaderConfig,

    /// Log record batching.
    pub logs: LogBatchConfig,

    /// Aggregate shutdown budget.
    pub shutdown: ShutdownConfig,

    /// Local diagnostic logging (the `tracing` subscriber).
    pub logging: LoggingConfig,
}

impl TelemetryConfig {
    /// Exporter and batching settings consumed by the pipeline builders.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            exporter: self.exporter.clone(),
            traces: self.traces.clone(),
            metrics: self.metrics.clone(),
            logs: self.logs.clone(),
            rollback_timeout: self.shutdown.timeout(),
        }
    }
}

/// Everything the pipeline builders need, detached from service identity.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub exporter: ExporterConfig,
    pub traces: TraceBatchConfig,
    pub metrics: MetricReaderConfig,
    pub logs: LogBatchConfig,

    /// Budget for unwinding already-built providers after a failed step.
    pub rollback_timeout: Duration,
}

impl PipelineSettings {
    /// Settings for the given transport, defaults everywhere else.
    pub fn new(kind: ExporterKind, address: impl Into<String>) -> Self {
        Self {
            exporter: ExporterConfig {
                kind,
                address: address.into(),
                ..ExporterConfig::default()
            },
            ..Self::default()
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            exporter: ExporterConfig::default(),
            traces: TraceBatchConfig::default(),
            metrics: MetricReaderConfig::default(),
            logs: LogBatchConfig::default(),
            rollback_timeout: ShutdownConfig::default().timeout(),
        }
    }
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `service.name` resource attribute.
    pub name: String,

    /// `service.version` resource attribute.
    pub version: String,

    /// `deployment.environment.name` resource attribute.
    pub environment: String,

    /// Extra build-time resource attributes.
    pub attributes: BTreeMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "rolldice.service".to_string(),
            version: "0.1.0".to_string(),
            environment: "dev".to_string(),
            attributes: BTreeMap::new(),
        }
    }
}

/// Exporter transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Transport used for every signal kind.
    pub kind: ExporterKind,

    /// Collector `host:port`. Ignored for the local exporter.
    /// gRPC collectors usually listen on 4317, HTTP ones on 4318.
    pub address: String,

    /// Reachability probe timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Per-export request timeout in milliseconds.
    pub export_timeout_ms: u64,
}

impl ExporterConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_ms)
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            kind: ExporterKind::Local,
            address: "localhost:4317".to_string(),
            connect_timeout_ms: 2_000,
            export_timeout_ms: 10_000,
        }
    }
}

/// Batch span processor settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceBatchConfig {
    /// Delay between scheduled exports in milliseconds.
    /// The SDK default is 5s; 1s keeps the demo responsive.
    pub flush_interval_ms: u64,

    /// Spans buffered before new ones are dropped.
    pub max_queue_size: usize,

    /// Spans per export request.
    pub max_export_batch_size: usize,
}

impl TraceBatchConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

impl Default for TraceBatchConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 1_000,
            max_queue_size: 2_048,
            max_export_batch_size: 512,
        }
    }
}

/// Periodic metric reader settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricReaderConfig {
    /// Collection interval in milliseconds. The SDK default is 60s.
    pub interval_ms: u64,
}

impl MetricReaderConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for MetricReaderConfig {
    fn default() -> Self {
        Self { interval_ms: 3_000 }
    }
}

/// Batch log processor settings.
///
/// A batch is exported when `max_export_batch_size` records are queued or
/// `flush_interval_ms` elapses, whichever comes first.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogBatchConfig {
    pub flush_interval_ms: u64,
    pub max_queue_size: usize,
    pub max_export_batch_size: usize,
}

impl LogBatchConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

impl Default for LogBatchConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 1_000,
            max_queue_size: 2_048,
            max_export_batch_size: 512,
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Total budget for draining every provider, in milliseconds.
    pub timeout_ms: u64,
}

impl ShutdownConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

/// Output format of the local `tracing` subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Local diagnostic logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_intervals() {
        let config = TelemetryConfig::default();
        assert_eq!(config.traces.flush_interval(), Duration::from_secs(1));
        assert_eq!(config.metrics.interval(), Duration::from_secs(3));
        assert_eq!(config.exporter.kind, ExporterKind::Local);
        assert_eq!(config.service.name, "rolldice.service");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TelemetryConfig = toml::from_str(
            r#"
            [exporter]
            kind = "grpc"
            address = "collector:4317"

            [metrics]
            interval_ms = 60000
            "#,
        )
        .unwrap();

        assert_eq!(config.exporter.kind, ExporterKind::Streaming);
        assert_eq!(config.exporter.address, "collector:4317");
        assert_eq!(config.exporter.connect_timeout_ms, 2_000);
        assert_eq!(config.metrics.interval(), Duration::from_secs(60));
        assert_eq!(config.traces.flush_interval_ms, 1_000);
    }

    #[test]
    fn test_pipeline_settings_carry_shutdown_budget() {
        let mut config = TelemetryConfig::default();
        config.shutdown.timeout_ms = 750;
        let settings = config.pipeline_settings();
        assert_eq!(settings.rollback_timeout, Duration::from_millis(750));
    }

    #[test]
    fn test_default_pipeline_settings_have_rollback_budget() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.rollback_timeout, ShutdownConfig::default().timeout());
        assert_eq!(settings.rollback_timeout, Duration::from_millis(5_000));
    }
}
