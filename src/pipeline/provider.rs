//! The shutdown surface shared by all signal providers.

use std::time::Duration;

use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use thiserror::Error;

use crate::transport::SignalKind;

/// Why a provider did not shut down cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("shutdown timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Failed(String),

    #[error("shutdown task panicked")]
    Panicked,
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }
}

/// A constructed provider for one signal kind.
///
/// `shutdown` blocks: it stops accepting data, flushes what is buffered and
/// releases the transport.
pub trait SignalProvider: Send + Sync + 'static {
    fn signal(&self) -> SignalKind;

    fn shutdown(&self) -> Result<(), ProviderError>;
}

fn sdk_result(result: OTelSdkResult) -> Result<(), ProviderError> {
    match result {
        Ok(()) | Err(OTelSdkError::AlreadyShutdown) => Ok(()),
        Err(OTelSdkError::Timeout(elapsed)) => Err(ProviderError::Timeout(elapsed)),
        Err(e) => Err(ProviderError::Failed(e.to_string())),
    }
}

impl SignalProvider for SdkTracerProvider {
    fn signal(&self) -> SignalKind {
        SignalKind::Trace
    }

    fn shutdown(&self) -> Result<(), ProviderError> {
        sdk_result(SdkTracerProvider::shutdown(self))
    }
}

impl SignalProvider for SdkMeterProvider {
    fn signal(&self) -> SignalKind {
        SignalKind::Metric
    }

    fn shutdown(&self) -> Result<(), ProviderError> {
        sdk_result(SdkMeterProvider::shutdown(self))
    }
}

impl SignalProvider for SdkLoggerProvider {
    fn signal(&self) -> SignalKind {
        SignalKind::Log
    }

    fn shutdown(&self) -> Result<(), ProviderError> {
        sdk_result(SdkLoggerProvider::shutdown(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_shutdown_is_not_an_error() {
        assert_eq!(sdk_result(Err(OTelSdkError::AlreadyShutdown)), Ok(()));
    }

    #[test]
    fn test_sdk_errors_are_kept() {
        assert_eq!(
            sdk_result(Err(OTelSdkError::Timeout(Duration::from_secs(2)))),
            Err(ProviderError::Timeout(Duration::from_secs(2)))
        );
        let err = sdk_result(Err(OTelSdkError::InternalFailure("exporter gone".into()))).unwrap_err();
        assert!(err.to_string().contains("exporter gone"));
    }

    #[test]
    fn test_sdk_provider_shuts_down_once() {
        let provider = SdkTracerProvider::builder().build();
        assert_eq!(SignalProvider::signal(&provider), SignalKind::Trace);
        assert_eq!(SignalProvider::shutdown(&provider), Ok(()));
        assert_eq!(SignalProvider::shutdown(&provider), Ok(()));
    }
}
