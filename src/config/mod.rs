//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides (main.rs)
//!     → TelemetryConfig (validated, immutable)
//!     → PipelineSettings handed to the lifecycle coordinator
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    ExporterConfig, LogBatchConfig, LogFormat, LoggingConfig, MetricReaderConfig,
    PipelineSettings, ServiceConfig, ShutdownConfig, TelemetryConfig, TraceBatchConfig,
};
pub use validation::{validate_config, validate_pipeline, ValidationError};
