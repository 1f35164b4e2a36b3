//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Application code:
//!     tracing macros → logging.rs subscriber
//!         → console (pretty or JSON)
//!         → tracer provider (spans, via tracing-opentelemetry)
//!         → logger provider (events, via the appender bridge)
//!
//!     opentelemetry::global → global.rs (tracer + meter providers, propagators)
//! ```
//!
//! # Design Decisions
//! - Both steps are optional and happen after bootstrap
//! - Exporter crates are filtered out of the bridge to avoid feedback loops

pub mod global;
pub mod logging;
