//! The result of a successful bootstrap.

use std::time::Duration;

use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

use crate::lifecycle::shutdown::{ShutdownError, ShutdownHandle, ShutdownRegistry};

/// Three ready providers and the aggregate shutdown that releases them.
///
/// Nothing here is process-wide. Installing the providers as globals is a
/// separate step (see [`Telemetry::install_global`]).
#[derive(Debug, Clone)]
pub struct Telemetry<T = SdkTracerProvider, M = SdkMeterProvider, L = SdkLoggerProvider> {
    tracer_provider: T,
    meter_provider: M,
    logger_provider: L,
    shutdown: ShutdownHandle,
}

impl<T, M, L> Telemetry<T, M, L> {
    pub(crate) fn new(tracer_provider: T, meter_provider: M, logger_provider: L, registry: ShutdownRegistry) -> Self {
        Self {
            tracer_provider,
            meter_provider,
            logger_provider,
            shutdown: ShutdownHandle::new(registry),
        }
    }

    pub fn tracer_provider(&self) -> &T {
        &self.tracer_provider
    }

    pub fn meter_provider(&self) -> &M {
        &self.meter_provider
    }

    pub fn logger_provider(&self) -> &L {
        &self.logger_provider
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Flush and release every provider, sharing one `timeout`.
    ///
    /// Safe to call more than once; later calls return `Ok(())`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ShutdownError> {
        self.shutdown.shutdown(timeout).await
    }
}
