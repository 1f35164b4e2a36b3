//! Log pipeline: exporter wrapped in a batch log processor.
//!
//! Records are exported when `max_export_batch_size` of them are queued or
//! when `flush_interval` elapses. Beyond `max_queue_size` new records are
//! dropped by the SDK.

use opentelemetry_sdk::logs::{BatchConfigBuilder, BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::Resource;
use tokio_util::sync::CancellationToken;

use crate::config::{ExporterConfig, LogBatchConfig};
use crate::lifecycle::BootstrapError;
use crate::pipeline::unexpected_exporter;
use crate::transport::{ExporterHandle, LogExporterHandle, SignalKind, TransportSelector};

pub async fn build_logger_provider(
    selector: &TransportSelector,
    exporter: &ExporterConfig,
    batch: &LogBatchConfig,
    resource: &Resource,
    cancel: &CancellationToken,
) -> Result<SdkLoggerProvider, BootstrapError> {
    let exporter = match selector.select(SignalKind::Log, exporter, cancel).await? {
        ExporterHandle::Log(exporter) => exporter,
        other => return Err(unexpected_exporter(SignalKind::Log, other)),
    };

    if cancel.is_cancelled() {
        drop(exporter);
        return Err(BootstrapError::Cancelled {
            signal: SignalKind::Log,
        });
    }

    let config = BatchConfigBuilder::default()
        .with_scheduled_delay(batch.flush_interval())
        .with_max_queue_size(batch.max_queue_size)
        .with_max_export_batch_size(batch.max_export_batch_size)
        .build();

    let processor = match exporter {
        LogExporterHandle::Otlp(exporter) => BatchLogProcessor::builder(exporter)
            .with_batch_config(config)
            .build(),
        LogExporterHandle::Stdout(exporter) => BatchLogProcessor::builder(exporter)
            .with_batch_config(config)
            .build(),
    };

    tracing::debug!(
        flush_interval = ?batch.flush_interval(),
        max_export_batch_size = batch.max_export_batch_size,
        "Logger provider assembled"
    );

    Ok(SdkLoggerProvider::builder()
        .with_log_processor(processor)
        .with_resource(resource.clone())
        .build())
}
