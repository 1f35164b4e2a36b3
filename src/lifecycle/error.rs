//! Bootstrap error taxonomy.

use thiserror::Error;

use crate::config::ValidationError;
use crate::lifecycle::shutdown::ShutdownError;
use crate::resource::ResourceError;
use crate::transport::{BoxError, SignalKind, UnsupportedTransport};

/// Everything that can stop the telemetry pipeline from coming up.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Rejected before any resource was created.
    #[error("invalid telemetry configuration: {}", join_validation(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("failed to build resource descriptor: {0}")]
    ResourceBuild(#[from] ResourceError),

    #[error(transparent)]
    UnsupportedTransport(#[from] UnsupportedTransport),

    #[error("failed to construct {signal} exporter: {source}")]
    ExporterConstruction {
        signal: SignalKind,
        #[source]
        source: BoxError,
    },

    #[error("{signal} pipeline construction cancelled")]
    Cancelled { signal: SignalKind },

    /// A construction failure whose rollback also failed. Both are kept.
    #[error("{cause}\nrollback failed:\n{rollback}")]
    Rollback {
        #[source]
        cause: Box<BootstrapError>,
        rollback: ShutdownError,
    },

    #[error("coordinator already ran (state: {state:?})")]
    AlreadyStarted {
        state: crate::lifecycle::LifecycleState,
    },
}

impl BootstrapError {
    /// The signal whose construction failed, looking through rollback wrappers.
    pub fn signal(&self) -> Option<SignalKind> {
        match self {
            BootstrapError::ExporterConstruction { signal, .. }
            | BootstrapError::Cancelled { signal } => Some(*signal),
            BootstrapError::UnsupportedTransport(e) => e.signal,
            BootstrapError::Rollback { cause, .. } => cause.signal(),
            _ => None,
        }
    }

    /// The error that triggered a rollback, or `self`.
    pub fn root_cause(&self) -> &BootstrapError {
        match self {
            BootstrapError::Rollback { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    pub fn rollback_error(&self) -> Option<&ShutdownError> {
        match self {
            BootstrapError::Rollback { rollback, .. } => Some(rollback),
            _ => None,
        }
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
