//! Signal pipeline subsystem.
//!
//! # Responsibilities
//! - Wrap each exporter in its batching/aggregation component
//! - Attach the shared resource to every provider
//! - Release the exporter if construction is abandoned half-way
//!
//! # Design Decisions
//! - One builder per signal kind, all with the same shape
//! - Builders never touch process-wide state
//! - The coordinator only sees the [`PipelineBuilder`] seam

pub mod log;
pub mod metric;
pub mod provider;
pub mod trace;

use async_trait::async_trait;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineSettings;
use crate::lifecycle::BootstrapError;
use crate::resource::ResourceDescriptor;
use crate::transport::{ExporterHandle, SignalKind, TransportSelector};

pub use provider::{ProviderError, SignalProvider};

/// Builds the three signal providers, one call per signal kind.
#[async_trait]
pub trait PipelineBuilder: Send + Sync {
    type Tracer: SignalProvider + Clone;
    type Meter: SignalProvider + Clone;
    type Logger: SignalProvider + Clone;

    async fn build_tracer(&self, cancel: &CancellationToken) -> Result<Self::Tracer, BootstrapError>;

    async fn build_meter(&self, cancel: &CancellationToken) -> Result<Self::Meter, BootstrapError>;

    async fn build_logger(&self, cancel: &CancellationToken) -> Result<Self::Logger, BootstrapError>;
}

/// OpenTelemetry SDK pipelines over the configured transport.
#[derive(Debug, Clone)]
pub struct OtelPipelines {
    selector: TransportSelector,
    settings: PipelineSettings,
    resource: Resource,
}

impl OtelPipelines {
    pub fn new(settings: PipelineSettings, resource: &ResourceDescriptor) -> Self {
        Self::with_selector(TransportSelector::new(), settings, resource)
    }

    pub fn with_selector(
        selector: TransportSelector,
        settings: PipelineSettings,
        resource: &ResourceDescriptor,
    ) -> Self {
        Self {
            selector,
            settings,
            resource: resource.to_sdk_resource(),
        }
    }
}

#[async_trait]
impl PipelineBuilder for OtelPipelines {
    type Tracer = SdkTracerProvider;
    type Meter = SdkMeterProvider;
    type Logger = SdkLoggerProvider;

    async fn build_tracer(&self, cancel: &CancellationToken) -> Result<SdkTracerProvider, BootstrapError> {
        trace::build_tracer_provider(
            &self.selector,
            &self.settings.exporter,
            &self.settings.traces,
            &self.resource,
            cancel,
        )
        .await
    }

    async fn build_meter(&self, cancel: &CancellationToken) -> Result<SdkMeterProvider, BootstrapError> {
        metric::build_meter_provider(
            &self.selector,
            &self.settings.exporter,
            &self.settings.metrics,
            &self.resource,
            cancel,
        )
        .await
    }

    async fn build_logger(&self, cancel: &CancellationToken) -> Result<SdkLoggerProvider, BootstrapError> {
        log::build_logger_provider(
            &self.selector,
            &self.settings.exporter,
            &self.settings.logs,
            &self.resource,
            cancel,
        )
        .await
    }
}

/// A recipe produced an exporter for the wrong signal.
pub(crate) fn unexpected_exporter(signal: SignalKind, handle: ExporterHandle) -> BootstrapError {
    let produced = handle.signal();
    drop(handle);
    BootstrapError::ExporterConstruction {
        signal,
        source: format!("recipe produced a {produced} exporter").into(),
    }
}
