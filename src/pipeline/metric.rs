//! Metric pipeline: exporter driven by a periodic reader.

use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::Resource;
use tokio_util::sync::CancellationToken;

use crate::config::{ExporterConfig, MetricReaderConfig};
use crate::lifecycle::BootstrapError;
use crate::pipeline::unexpected_exporter;
use crate::transport::{ExporterHandle, MetricExporterHandle, SignalKind, TransportSelector};

pub async fn build_meter_provider(
    selector: &TransportSelector,
    exporter: &ExporterConfig,
    reader: &MetricReaderConfig,
    resource: &Resource,
    cancel: &CancellationToken,
) -> Result<SdkMeterProvider, BootstrapError> {
    let exporter = match selector.select(SignalKind::Metric, exporter, cancel).await? {
        ExporterHandle::Metric(exporter) => exporter,
        other => return Err(unexpected_exporter(SignalKind::Metric, other)),
    };

    if cancel.is_cancelled() {
        drop(exporter);
        return Err(BootstrapError::Cancelled {
            signal: SignalKind::Metric,
        });
    }

    // PeriodicReader is generic over its exporter, so each arm finishes the provider.
    let builder = SdkMeterProvider::builder().with_resource(resource.clone());
    let provider = match exporter {
        MetricExporterHandle::Otlp(exporter) => builder
            .with_reader(
                PeriodicReader::builder(exporter)
                    .with_interval(reader.interval())
                    .build(),
            )
            .build(),
        MetricExporterHandle::Stdout(exporter) => builder
            .with_reader(
                PeriodicReader::builder(exporter)
                    .with_interval(reader.interval())
                    .build(),
            )
            .build(),
    };

    tracing::debug!(interval = ?reader.interval(), "Meter provider assembled");
    Ok(provider)
}
