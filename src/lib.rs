//! Telemetry bootstrap library.
//!
//! Builds trace, metric and log pipelines over a shared resource description,
//! rolls back whatever was built if a later pipeline fails, and returns the
//! providers with one aggregate shutdown.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod resource;
pub mod transport;

pub use config::schema::{PipelineSettings, TelemetryConfig};
pub use lifecycle::{bootstrap, BootstrapError, ShutdownError, Telemetry};
pub use resource::ResourceDescriptor;
pub use transport::{ExporterKind, SignalKind};
