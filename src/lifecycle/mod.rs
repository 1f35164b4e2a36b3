//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate settings → Trace → Metric → Log → Telemetry
//!     Failure at step k → shut down steps 1..k-1 → BootstrapError
//!
//! Shutdown (shutdown.rs):
//!     Telemetry::shutdown → each provider in registration order → joined errors
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → cancel the root CancellationToken
//! ```
//!
//! # Design Decisions
//! - Ordered startup: traces first, logs last
//! - Shutdown never short-circuits and runs at most once per provider
//! - Shutdown shares one deadline across all providers

pub mod error;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod telemetry;

pub use error::BootstrapError;
pub use shutdown::{ProviderFailure, ShutdownError, ShutdownHandle, ShutdownRegistry};
pub use signals::spawn_signal_listener;
pub use startup::{bootstrap, LifecycleCoordinator, LifecycleState};
pub use telemetry::Telemetry;
