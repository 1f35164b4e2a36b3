mod common;

use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use telemetry_bootstrap::lifecycle::{LifecycleCoordinator, LifecycleState};
use telemetry_bootstrap::pipeline::OtelPipelines;
use telemetry_bootstrap::transport::{TransportSelector, DEFAULT_RECIPES};
use telemetry_bootstrap::{bootstrap, BootstrapError, ExporterKind, SignalKind};

/// A collector stand-in: accepts connections and never answers.
async fn silent_collector() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    (listener, address)
}

#[tokio::test]
async fn streaming_bootstrap_and_shutdown() {
    let (_collector, address) = silent_collector().await;

    let telemetry = bootstrap(
        &CancellationToken::new(),
        &common::settings(ExporterKind::Streaming, &address),
        &common::resource(),
    )
    .await
    .unwrap();

    telemetry.shutdown(Duration::from_secs(5)).await.unwrap();
    assert!(telemetry.shutdown_handle().is_drained());
    telemetry.shutdown(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn buffered_bootstrap_and_shutdown() {
    let (_collector, address) = silent_collector().await;

    let telemetry = bootstrap(
        &CancellationToken::new(),
        &common::settings(ExporterKind::Buffered, &address),
        &common::resource(),
    )
    .await
    .unwrap();

    telemetry.shutdown(Duration::from_secs(5)).await.unwrap();
    assert!(telemetry.shutdown_handle().is_drained());
}

#[tokio::test]
async fn later_signal_failure_releases_network_trace_provider() {
    let (_collector, address) = silent_collector().await;

    let without_metric_streaming = DEFAULT_RECIPES
        .into_iter()
        .filter(|r| !(r.signal == SignalKind::Metric && r.kind == ExporterKind::Streaming));
    let pipelines = OtelPipelines::with_selector(
        TransportSelector::with_recipes(without_metric_streaming),
        common::settings(ExporterKind::Streaming, &address),
        &common::resource(),
    );
    let mut coordinator = LifecycleCoordinator::new(pipelines, Duration::from_secs(5));

    let err = coordinator.run(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.signal(), Some(SignalKind::Metric));
    assert!(matches!(err, BootstrapError::UnsupportedTransport(_)));
    // Rollback of the trace provider succeeded, so no rollback error is attached.
    assert!(err.rollback_error().is_none());
    assert_eq!(coordinator.state(), LifecycleState::Failed);
}
