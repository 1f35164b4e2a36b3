//! Exporter construction recipes, one per (signal, transport) pair.

use std::fmt;
use std::time::Duration;

use opentelemetry_otlp::{Protocol, WithExportConfig};

use crate::transport::types::{ExporterKind, SignalKind};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Builds one exporter for one collector endpoint.
pub type BuildFn = fn(&Endpoint) -> Result<ExporterHandle, BoxError>;

/// A table entry of the transport selector.
#[derive(Clone, Copy)]
pub struct Recipe {
    pub signal: SignalKind,
    pub kind: ExporterKind,
    pub build: BuildFn,
}

impl fmt::Debug for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("signal", &self.signal)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Where and how long a network exporter talks to the collector.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub address: String,
    pub export_timeout: Duration,
}

impl Endpoint {
    fn grpc_url(&self) -> String {
        format!("http://{}", self.address)
    }

    fn http_url(&self, signal: SignalKind) -> String {
        format!("http://{}{}", self.address, signal.http_path())
    }
}

/// A constructed exporter, not yet wrapped in a batching component.
pub enum ExporterHandle {
    Span(SpanExporterHandle),
    Metric(MetricExporterHandle),
    Log(LogExporterHandle),
}

pub enum SpanExporterHandle {
    Otlp(opentelemetry_otlp::SpanExporter),
    Stdout(opentelemetry_stdout::SpanExporter),
}

pub enum MetricExporterHandle {
    Otlp(opentelemetry_otlp::MetricExporter),
    Stdout(opentelemetry_stdout::MetricExporter),
}

pub enum LogExporterHandle {
    Otlp(opentelemetry_otlp::LogExporter),
    Stdout(opentelemetry_stdout::LogExporter),
}

impl ExporterHandle {
    pub fn signal(&self) -> SignalKind {
        match self {
            ExporterHandle::Span(_) => SignalKind::Trace,
            ExporterHandle::Metric(_) => SignalKind::Metric,
            ExporterHandle::Log(_) => SignalKind::Log,
        }
    }

    /// Whether the exporter writes locally instead of to a collector.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ExporterHandle::Span(SpanExporterHandle::Stdout(_))
                | ExporterHandle::Metric(MetricExporterHandle::Stdout(_))
                | ExporterHandle::Log(LogExporterHandle::Stdout(_))
        )
    }
}

impl fmt::Debug for ExporterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transport = if self.is_local() { "stdout" } else { "otlp" };
        write!(f, "ExporterHandle({}, {transport})", self.signal())
    }
}

/// The nine built-in recipes.
pub const DEFAULT_RECIPES: [Recipe; 9] = [
    Recipe { signal: SignalKind::Trace, kind: ExporterKind::Streaming, build: trace_streaming },
    Recipe { signal: SignalKind::Trace, kind: ExporterKind::Buffered, build: trace_buffered },
    Recipe { signal: SignalKind::Trace, kind: ExporterKind::Local, build: trace_local },
    Recipe { signal: SignalKind::Metric, kind: ExporterKind::Streaming, build: metric_streaming },
    Recipe { signal: SignalKind::Metric, kind: ExporterKind::Buffered, build: metric_buffered },
    Recipe { signal: SignalKind::Metric, kind: ExporterKind::Local, build: metric_local },
    Recipe { signal: SignalKind::Log, kind: ExporterKind::Streaming, build: log_streaming },
    Recipe { signal: SignalKind::Log, kind: ExporterKind::Buffered, build: log_buffered },
    Recipe { signal: SignalKind::Log, kind: ExporterKind::Local, build: log_local },
];

fn trace_streaming(endpoint: &Endpoint) -> Result<ExporterHandle, BoxError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.grpc_url())
        .with_timeout(endpoint.export_timeout)
        .build()?;
    Ok(ExporterHandle::Span(SpanExporterHandle::Otlp(exporter)))
}

fn trace_buffered(endpoint: &Endpoint) -> Result<ExporterHandle, BoxError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint.http_url(SignalKind::Trace))
        .with_timeout(endpoint.export_timeout)
        .with_protocol(Protocol::HttpBinary)
        .build()?;
    Ok(ExporterHandle::Span(SpanExporterHandle::Otlp(exporter)))
}

fn trace_local(_: &Endpoint) -> Result<ExporterHandle, BoxError> {
    Ok(ExporterHandle::Span(SpanExporterHandle::Stdout(
        opentelemetry_stdout::SpanExporter::default(),
    )))
}

fn metric_streaming(endpoint: &Endpoint) -> Result<ExporterHandle, BoxError> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.grpc_url())
        .with_timeout(endpoint.export_timeout)
        .build()?;
    Ok(ExporterHandle::Metric(MetricExporterHandle::Otlp(exporter)))
}

fn metric_buffered(endpoint: &Endpoint) -> Result<ExporterHandle, BoxError> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_http()
        .with_endpoint(endpoint.http_url(SignalKind::Metric))
        .with_timeout(endpoint.export_timeout)
        .with_protocol(Protocol::HttpBinary)
        .build()?;
    Ok(ExporterHandle::Metric(MetricExporterHandle::Otlp(exporter)))
}

fn metric_local(_: &Endpoint) -> Result<ExporterHandle, BoxError> {
    Ok(ExporterHandle::Metric(MetricExporterHandle::Stdout(
        opentelemetry_stdout::MetricExporter::default(),
    )))
}

fn log_streaming(endpoint: &Endpoint) -> Result<ExporterHandle, BoxError> {
    let exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.grpc_url())
        .with_timeout(endpoint.export_timeout)
        .build()?;
    Ok(ExporterHandle::Log(LogExporterHandle::Otlp(exporter)))
}

fn log_buffered(endpoint: &Endpoint) -> Result<ExporterHandle, BoxError> {
    let exporter = opentelemetry_otlp::LogExporter::builder()
        .with_http()
        .with_endpoint(endpoint.http_url(SignalKind::Log))
        .with_timeout(endpoint.export_timeout)
        .with_protocol(Protocol::HttpBinary)
        .build()?;
    Ok(ExporterHandle::Log(LogExporterHandle::Otlp(exporter)))
}

fn log_local(_: &Endpoint) -> Result<ExporterHandle, BoxError> {
    Ok(ExporterHandle::Log(LogExporterHandle::Stdout(
        opentelemetry_stdout::LogExporter::default(),
    )))
}
