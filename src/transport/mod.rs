//! Export transport subsystem.
//!
//! # Data Flow
//! ```text
//! ExporterConfig { kind, address }
//!     → selector.rs (table lookup keyed by signal + transport)
//!     → probe collector (network transports only)
//!     → recipes.rs (build OTLP gRPC / OTLP HTTP / stdout exporter)
//!     → ExporterHandle handed to the signal pipeline builder
//! ```
//!
//! # Design Decisions
//! - Closed set of transports; unknown names are rejected, not defaulted
//! - One transport applies to traces, metrics and logs alike
//! - Wire encoding is left to the OpenTelemetry exporter crates

pub mod recipes;
pub mod selector;
pub mod types;

pub use recipes::{
    BoxError, BuildFn, Endpoint, ExporterHandle, LogExporterHandle, MetricExporterHandle, Recipe,
    SpanExporterHandle, DEFAULT_RECIPES,
};
pub use selector::TransportSelector;
pub use types::{ExporterKind, SignalKind, UnsupportedTransport};
