//! Trace pipeline: exporter wrapped in a batch span processor.

use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tokio_util::sync::CancellationToken;

use crate::config::{ExporterConfig, TraceBatchConfig};
use crate::lifecycle::BootstrapError;
use crate::pipeline::unexpected_exporter;
use crate::transport::{ExporterHandle, SignalKind, SpanExporterHandle, TransportSelector};

pub async fn build_tracer_provider(
    selector: &TransportSelector,
    exporter: &ExporterConfig,
    batch: &TraceBatchConfig,
    resource: &Resource,
    cancel: &CancellationToken,
) -> Result<SdkTracerProvider, BootstrapError> {
    let exporter = match selector.select(SignalKind::Trace, exporter, cancel).await? {
        ExporterHandle::Span(exporter) => exporter,
        other => return Err(unexpected_exporter(SignalKind::Trace, other)),
    };

    if cancel.is_cancelled() {
        drop(exporter);
        return Err(BootstrapError::Cancelled {
            signal: SignalKind::Trace,
        });
    }

    let config = BatchConfigBuilder::default()
        .with_scheduled_delay(batch.flush_interval())
        .with_max_queue_size(batch.max_queue_size)
        .with_max_export_batch_size(batch.max_export_batch_size)
        .build();

    let processor = match exporter {
        SpanExporterHandle::Otlp(exporter) => BatchSpanProcessor::builder(exporter)
            .with_batch_config(config)
            .build(),
        SpanExporterHandle::Stdout(exporter) => BatchSpanProcessor::builder(exporter)
            .with_batch_config(config)
            .build(),
    };

    tracing::debug!(
        flush_interval = ?batch.flush_interval(),
        max_queue_size = batch.max_queue_size,
        "Tracer provider assembled"
    );

    Ok(SdkTracerProvider::builder()
        .with_span_processor(processor)
        .with_resource(resource.clone())
        .build())
}
