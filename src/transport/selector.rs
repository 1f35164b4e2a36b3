//! Transport selection.
//!
//! # Responsibilities
//! - Map `(SignalKind, ExporterKind)` to a construction recipe
//! - Probe the collector before building a network exporter
//! - Keep the local transport free of network I/O
//!
//! # Design Decisions
//! - Missing table entries are errors, never a silent fallback
//! - Address validation is eager and identical for all three signals
//! - HTTP exporters wrap a blocking client, so they are built off the runtime

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::config::ExporterConfig;
use crate::lifecycle::BootstrapError;
use crate::transport::recipes::{BuildFn, Endpoint, ExporterHandle, Recipe, DEFAULT_RECIPES};
use crate::transport::types::{ExporterKind, SignalKind, UnsupportedTransport};

/// Lookup table of exporter recipes.
#[derive(Debug, Clone)]
pub struct TransportSelector {
    recipes: HashMap<(SignalKind, ExporterKind), Recipe>,
}

impl TransportSelector {
    /// Selector with all nine built-in recipes.
    pub fn new() -> Self {
        Self::with_recipes(DEFAULT_RECIPES)
    }

    /// Selector restricted to the given recipes. Later entries replace
    /// earlier ones for the same pair.
    pub fn with_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let recipes = recipes
            .into_iter()
            .map(|recipe| ((recipe.signal, recipe.kind), recipe))
            .collect();
        Self { recipes }
    }

    pub fn supports(&self, signal: SignalKind, kind: ExporterKind) -> bool {
        self.recipes.contains_key(&(signal, kind))
    }

    /// Construct the exporter for `signal` over the configured transport.
    pub async fn select(
        &self,
        signal: SignalKind,
        exporter: &ExporterConfig,
        cancel: &CancellationToken,
    ) -> Result<ExporterHandle, BootstrapError> {
        let build = self.lookup(signal, exporter.kind)?;
        let endpoint = Endpoint {
            address: exporter.address.trim().to_string(),
            export_timeout: exporter.export_timeout(),
        };

        if !exporter.kind.is_network() {
            return build(&endpoint)
                .map_err(|source| BootstrapError::ExporterConstruction { signal, source });
        }

        probe_collector(&endpoint.address, exporter.connect_timeout(), cancel)
            .await
            .map_err(|e| match e {
                ProbeError::Cancelled => BootstrapError::Cancelled { signal },
                ProbeError::Unreachable(source) => BootstrapError::ExporterConstruction {
                    signal,
                    source: Box::new(source),
                },
            })?;

        tracing::debug!(
            signal = %signal,
            transport = %exporter.kind,
            address = %endpoint.address,
            "Collector reachable, building exporter"
        );

        let handle = match exporter.kind {
            ExporterKind::Buffered => tokio::task::spawn_blocking(move || build(&endpoint))
                .await
                .map_err(|join| BootstrapError::ExporterConstruction {
                    signal,
                    source: Box::new(join),
                })?,
            _ => build(&endpoint),
        };

        handle.map_err(|source| BootstrapError::ExporterConstruction { signal, source })
    }

    fn lookup(&self, signal: SignalKind, kind: ExporterKind) -> Result<BuildFn, UnsupportedTransport> {
        self.recipes
            .get(&(signal, kind))
            .map(|recipe| recipe.build)
            .ok_or_else(|| UnsupportedTransport::for_signal(kind, signal))
    }
}

impl Default for TransportSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
enum ProbeError {
    Cancelled,
    Unreachable(io::Error),
}

/// Open and immediately drop a TCP connection to the collector.
async fn probe_collector(
    address: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(), ProbeError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        result = tokio::time::timeout(timeout, TcpStream::connect(address)) => match result {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Unreachable(io::Error::new(
                e.kind(),
                format!("collector at {address} unreachable: {e}"),
            ))),
            Err(_) => Err(ProbeError::Unreachable(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("collector at {address} did not accept a connection within {timeout:?}"),
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn exporter(kind: ExporterKind, address: &str) -> ExporterConfig {
        ExporterConfig {
            kind,
            address: address.to_string(),
            connect_timeout_ms: 500,
            ..ExporterConfig::default()
        }
    }

    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    #[tokio::test]
    async fn test_missing_recipe_is_unsupported() {
        let local_traces_only = DEFAULT_RECIPES
            .into_iter()
            .filter(|r| r.signal == SignalKind::Trace && r.kind == ExporterKind::Local);
        let selector = TransportSelector::with_recipes(local_traces_only);
        assert!(selector.supports(SignalKind::Trace, ExporterKind::Local));
        assert!(!selector.supports(SignalKind::Metric, ExporterKind::Local));

        let err = selector
            .select(
                SignalKind::Metric,
                &exporter(ExporterKind::Local, ""),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::UnsupportedTransport(UnsupportedTransport {
                signal: Some(SignalKind::Metric),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_local_ignores_address() {
        let selector = TransportSelector::new();
        for signal in SignalKind::ALL {
            let handle = selector
                .select(
                    signal,
                    &exporter(ExporterKind::Local, "not even an address"),
                    &CancellationToken::new(),
                )
                .await
                .unwrap();
            assert_eq!(handle.signal(), signal);
            assert!(handle.is_local());
        }
    }

    #[tokio::test]
    async fn test_unreachable_collector_fails_construction() {
        let address = closed_port().await;
        let err = TransportSelector::new()
            .select(
                SignalKind::Log,
                &exporter(ExporterKind::Streaming, &address),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::ExporterConstruction {
                signal: SignalKind::Log,
                ..
            }
        ));
        assert!(err.to_string().contains(&address));
    }

    #[tokio::test]
    async fn test_cancelled_probe_reports_signal() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = TransportSelector::new()
            .select(
                SignalKind::Metric,
                &exporter(ExporterKind::Buffered, "127.0.0.1:4318"),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::Cancelled {
                signal: SignalKind::Metric
            }
        ));
    }

    #[tokio::test]
    async fn test_probe_accepts_listening_collector() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let result =
            probe_collector(&address, Duration::from_millis(500), &CancellationToken::new()).await;
        assert!(result.is_ok());
    }
}
