//! Resource description subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig (name, version, environment, attributes)
//!     → descriptor.rs (explicit attributes)
//!     → detectors.rs (env overrides → process → os → host, later wins)
//!     → ResourceDescriptor (immutable)
//!     → SDK Resource attached to every provider
//! ```
//!
//! # Design Decisions
//! - Environment overrides beat build-time constants
//! - A detector that cannot read its source is skipped, not fatal
//! - Malformed override syntax is fatal

pub mod descriptor;
pub mod detectors;

pub use descriptor::{
    AttributeValue, ResourceBuilder, ResourceDescriptor, ResourceError,
    DEPLOYMENT_ENVIRONMENT_NAME,
};
pub use detectors::{
    DetectError, EnvDetector, HostDetector, OsDetector, ProcessDetector, ResourceDetector,
};
