//! Shutdown coordination for the signal providers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::Instant;

use crate::pipeline::{ProviderError, SignalProvider};
use crate::transport::SignalKind;

/// One provider that did not shut down cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{signal} provider shutdown failed: {cause}")]
pub struct ProviderFailure {
    pub signal: SignalKind,
    #[source]
    pub cause: ProviderError,
}

/// Every failure from one aggregate shutdown, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ShutdownError {
    failures: Vec<ProviderFailure>,
}

impl ShutdownError {
    pub fn new(failures: Vec<ProviderFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[ProviderFailure] {
        &self.failures
    }

    pub fn signals(&self) -> Vec<SignalKind> {
        self.failures.iter().map(|f| f.signal).collect()
    }

    fn from_failures(failures: Vec<ProviderFailure>) -> Result<(), Self> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self::new(failures))
        }
    }
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// Ordered providers awaiting shutdown.
///
/// Appended to during bootstrap, drained exactly once. Draining an empty
/// registry is a no-op that returns `Ok(())`, so a second shutdown call
/// cannot tell whether the first one did any work.
#[derive(Clone, Default)]
pub struct ShutdownRegistry {
    entries: Arc<Mutex<Vec<Box<dyn SignalProvider>>>>,
}

impl ShutdownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, provider: Box<dyn SignalProvider>) {
        tracing::debug!(signal = %provider.signal(), "Provider registered for shutdown");
        self.entries.lock().push(provider);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn signals(&self) -> Vec<SignalKind> {
        self.entries.lock().iter().map(|p| p.signal()).collect()
    }

    /// Shut down every registered provider in registration order.
    ///
    /// All providers share one deadline of `timeout` from now. A failure
    /// does not stop the walk; every failure ends up in the returned error.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ShutdownError> {
        let entries = std::mem::take(&mut *self.entries.lock());
        if entries.is_empty() {
            return Ok(());
        }

        let deadline = Instant::now() + timeout;
        let mut failures = Vec::new();

        for provider in entries {
            let signal = provider.signal();
            let remaining = deadline.saturating_duration_since(Instant::now());
            let task = tokio::task::spawn_blocking(move || provider.shutdown());

            let outcome = match tokio::time::timeout(remaining, task).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(ProviderError::Panicked),
                Err(_) => Err(ProviderError::Timeout(remaining)),
            };

            match outcome {
                Ok(()) => tracing::debug!(signal = %signal, "Provider shut down"),
                Err(cause) => {
                    tracing::warn!(signal = %signal, error = %cause, "Provider shutdown failed");
                    failures.push(ProviderFailure { signal, cause });
                }
            }
        }

        ShutdownError::from_failures(failures)
    }
}

impl fmt::Debug for ShutdownRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownRegistry")
            .field("signals", &self.signals())
            .finish()
    }
}

/// The aggregate shutdown returned by a successful bootstrap.
///
/// Cloneable so it can be handed to a signal handler while the providers
/// are passed to instrumentation sites.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    registry: ShutdownRegistry,
}

impl ShutdownHandle {
    pub(crate) fn new(registry: ShutdownRegistry) -> Self {
        Self { registry }
    }

    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ShutdownError> {
        self.registry.shutdown(timeout).await
    }

    /// Whether nothing is left to shut down.
    pub fn is_drained(&self) -> bool {
        self.registry.is_empty()
    }
}
