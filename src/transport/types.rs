//! Signal and transport kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three telemetry signals, in bootstrap order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalKind {
    Trace,
    Metric,
    Log,
}

impl SignalKind {
    /// Construction order used by the lifecycle coordinator.
    pub const ALL: [SignalKind; 3] = [SignalKind::Trace, SignalKind::Metric, SignalKind::Log];

    pub const fn as_str(self) -> &'static str {
        match self {
            SignalKind::Trace => "trace",
            SignalKind::Metric => "metric",
            SignalKind::Log => "log",
        }
    }

    /// Path appended to the collector address by the HTTP transport.
    pub const fn http_path(self) -> &'static str {
        match self {
            SignalKind::Trace => "/v1/traces",
            SignalKind::Metric => "/v1/metrics",
            SignalKind::Log => "/v1/logs",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export transport, applied uniformly to every signal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExporterKind {
    /// OTLP over a persistent gRPC connection.
    #[serde(alias = "grpc")]
    Streaming,

    /// OTLP over request/response HTTP with protobuf bodies.
    #[serde(alias = "http")]
    Buffered,

    /// Pretty-printed to stdout. Never touches the network.
    #[default]
    #[serde(alias = "stdout")]
    Local,
}

impl ExporterKind {
    pub const ALL: [ExporterKind; 3] = [
        ExporterKind::Streaming,
        ExporterKind::Buffered,
        ExporterKind::Local,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ExporterKind::Streaming => "streaming",
            ExporterKind::Buffered => "buffered",
            ExporterKind::Local => "local",
        }
    }

    /// Whether this transport needs a collector address.
    pub const fn is_network(self) -> bool {
        !matches!(self, ExporterKind::Local)
    }
}

impl fmt::Display for ExporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExporterKind {
    type Err = UnsupportedTransport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" | "grpc" => Ok(ExporterKind::Streaming),
            "buffered" | "http" => Ok(ExporterKind::Buffered),
            "local" | "stdout" => Ok(ExporterKind::Local),
            _ => Err(UnsupportedTransport::named(s)),
        }
    }
}

/// Requested transport is not one of the known exporter kinds, or the
/// selector has no recipe for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported transport `{transport}`{}", .signal.map(|s| format!(" for {s} signal")).unwrap_or_default())]
pub struct UnsupportedTransport {
    pub transport: String,
    pub signal: Option<SignalKind>,
}

impl UnsupportedTransport {
    pub fn named(transport: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            signal: None,
        }
    }

    pub fn for_signal(kind: ExporterKind, signal: SignalKind) -> Self {
        Self {
            transport: kind.to_string(),
            signal: Some(signal),
        }
    }
}
