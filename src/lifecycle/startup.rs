//! Startup orchestration.
//!
//! # Responsibilities
//! - Build trace, metric and log providers in that order
//! - Register each provider for shutdown as soon as it exists
//! - Unwind everything already built when a later step fails
//!
//! # Design Decisions
//! - Fail fast: invalid settings are rejected before anything is created
//! - Steps run sequentially, never concurrently
//! - A failed first step has nothing to unwind and returns directly

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{validate_pipeline, PipelineSettings};
use crate::lifecycle::error::BootstrapError;
use crate::lifecycle::shutdown::ShutdownRegistry;
use crate::lifecycle::telemetry::Telemetry;
use crate::pipeline::{OtelPipelines, PipelineBuilder};
use crate::resource::ResourceDescriptor;

/// Where the coordinator is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Init,
    TraceReady,
    MetricReady,
    LogReady,
    Installed,
    Failed,
}

/// Sequences the three builders and owns the rollback.
pub struct LifecycleCoordinator<B: PipelineBuilder> {
    builder: B,
    rollback_timeout: Duration,
    registry: ShutdownRegistry,
    state: LifecycleState,
}

impl<B: PipelineBuilder> LifecycleCoordinator<B> {
    pub fn new(builder: B, rollback_timeout: Duration) -> Self {
        Self {
            builder,
            rollback_timeout,
            registry: ShutdownRegistry::new(),
            state: LifecycleState::Init,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Run the startup sequence once.
    ///
    /// On error every provider that was built has already been shut down.
    pub async fn run(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Telemetry<B::Tracer, B::Meter, B::Logger>, BootstrapError> {
        if self.state != LifecycleState::Init {
            return Err(BootstrapError::AlreadyStarted { state: self.state });
        }

        let tracer = match self.builder.build_tracer(cancel).await {
            Ok(tracer) => tracer,
            Err(e) => {
                self.transition(LifecycleState::Failed);
                return Err(e);
            }
        };
        self.registry.register(Box::new(tracer.clone()));
        self.transition(LifecycleState::TraceReady);

        let meter = match self.builder.build_meter(cancel).await {
            Ok(meter) => meter,
            Err(e) => return Err(self.roll_back(e).await),
        };
        self.registry.register(Box::new(meter.clone()));
        self.transition(LifecycleState::MetricReady);

        let logger = match self.builder.build_logger(cancel).await {
            Ok(logger) => logger,
            Err(e) => return Err(self.roll_back(e).await),
        };
        self.registry.register(Box::new(logger.clone()));
        self.transition(LifecycleState::LogReady);

        self.transition(LifecycleState::Installed);
        Ok(Telemetry::new(tracer, meter, logger, self.registry.clone()))
    }

    async fn roll_back(&mut self, cause: BootstrapError) -> BootstrapError {
        tracing::warn!(
            error = %cause,
            registered = ?self.registry.signals(),
            "Pipeline construction failed, rolling back"
        );

        let result = self.registry.shutdown(self.rollback_timeout).await;
        self.transition(LifecycleState::Failed);

        match result {
            Ok(()) => cause,
            Err(rollback) => BootstrapError::Rollback {
                cause: Box::new(cause),
                rollback,
            },
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        tracing::debug!(from = ?self.state, to = ?next, "Lifecycle transition");
        self.state = next;
    }
}

/// Build the trace, metric and log pipelines for `settings`.
///
/// Nothing is installed process-wide. The caller owns the returned
/// [`Telemetry`] and must call its shutdown before exit.
pub async fn bootstrap(
    cancel: &CancellationToken,
    settings: &PipelineSettings,
    resource: &ResourceDescriptor,
) -> Result<Telemetry, BootstrapError> {
    validate_pipeline(settings).map_err(BootstrapError::InvalidConfig)?;

    tracing::info!(
        exporter = %settings.exporter.kind,
        address = %settings.exporter.address,
        service = resource.service_name().unwrap_or("unknown"),
        "Bootstrapping telemetry pipelines"
    );

    let pipelines = OtelPipelines::new(settings.clone(), resource);
    let mut coordinator = LifecycleCoordinator::new(pipelines, settings.rollback_timeout);
    let telemetry = coordinator.run(cancel).await?;

    tracing::info!("Telemetry pipelines installed");
    Ok(telemetry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ProviderError, SignalProvider};
    use crate::transport::SignalKind;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Built(SignalKind),
        Released(SignalKind),
    }

    type Events = Arc<Mutex<Vec<Event>>>;

    #[derive(Debug, Clone)]
    struct FakeProvider {
        signal: SignalKind,
        release_error: Option<String>,
        events: Events,
    }

    impl SignalProvider for FakeProvider {
        fn signal(&self) -> SignalKind {
            self.signal
        }

        fn shutdown(&self) -> Result<(), ProviderError> {
            self.events.lock().push(Event::Released(self.signal));
            match &self.release_error {
                Some(reason) => Err(ProviderError::Failed(reason.clone())),
                None => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct Script {
        fail_at: Option<SignalKind>,
        cancel_after: Option<SignalKind>,
        release_error: Option<(SignalKind, String)>,
        events: Events,
    }

    impl Script {
        fn build(&self, signal: SignalKind, cancel: &CancellationToken) -> Result<FakeProvider, BootstrapError> {
            if cancel.is_cancelled() {
                return Err(BootstrapError::Cancelled { signal });
            }
            if self.fail_at == Some(signal) {
                return Err(BootstrapError::ExporterConstruction {
                    signal,
                    source: "connection refused".into(),
                });
            }
            self.events.lock().push(Event::Built(signal));
            if self.cancel_after == Some(signal) {
                cancel.cancel();
            }
            let release_error = self
                .release_error
                .as_ref()
                .filter(|(s, _)| *s == signal)
                .map(|(_, reason)| reason.clone());
            Ok(FakeProvider {
                signal,
                release_error,
                events: self.events.clone(),
            })
        }
    }

    #[async_trait]
    impl PipelineBuilder for Script {
        type Tracer = FakeProvider;
        type Meter = FakeProvider;
        type Logger = FakeProvider;

        async fn build_tracer(&self, cancel: &CancellationToken) -> Result<FakeProvider, BootstrapError> {
            self.build(SignalKind::Trace, cancel)
        }

        async fn build_meter(&self, cancel: &CancellationToken) -> Result<FakeProvider, BootstrapError> {
            self.build(SignalKind::Metric, cancel)
        }

        async fn build_logger(&self, cancel: &CancellationToken) -> Result<FakeProvider, BootstrapError> {
            self.build(SignalKind::Log, cancel)
        }
    }

    fn coordinator(script: Script) -> LifecycleCoordinator<Script> {
        LifecycleCoordinator::new(script, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_all_signals_installed() {
        let events = Events::default();
        let mut coordinator = coordinator(Script {
            events: events.clone(),
            ..Default::default()
        });

        let telemetry = coordinator.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(coordinator.state(), LifecycleState::Installed);
        assert_eq!(telemetry.logger_provider().signal, SignalKind::Log);

        telemetry.shutdown(Duration::from_secs(1)).await.unwrap();
        telemetry.shutdown(Duration::from_secs(1)).await.unwrap();
        assert_eq!(
            *events.lock(),
            vec![
                Event::Built(SignalKind::Trace),
                Event::Built(SignalKind::Metric),
                Event::Built(SignalKind::Log),
                Event::Released(SignalKind::Trace),
                Event::Released(SignalKind::Metric),
                Event::Released(SignalKind::Log),
            ]
        );
    }

    #[tokio::test]
    async fn test_first_failure_has_nothing_to_unwind() {
        let events = Events::default();
        let mut coordinator = coordinator(Script {
            fail_at: Some(SignalKind::Trace),
            events: events.clone(),
            ..Default::default()
        });

        let err = coordinator.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::ExporterConstruction {
                signal: SignalKind::Trace,
                ..
            }
        ));
        assert_eq!(coordinator.state(), LifecycleState::Failed);
        assert!(events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failure_unwinds_earlier_signals_only() {
        let events = Events::default();
        let mut coordinator = coordinator(Script {
            fail_at: Some(SignalKind::Metric),
            events: events.clone(),
            ..Default::default()
        });

        let err = coordinator.run(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.signal(), Some(SignalKind::Metric));
        assert!(err.rollback_error().is_none());
        assert_eq!(coordinator.state(), LifecycleState::Failed);
        assert_eq!(
            *events.lock(),
            vec![Event::Built(SignalKind::Trace), Event::Released(SignalKind::Trace)]
        );
    }

    #[tokio::test]
    async fn test_log_failure_unwinds_in_registration_order() {
        let events = Events::default();
        let mut coordinator = coordinator(Script {
            fail_at: Some(SignalKind::Log),
            events: events.clone(),
            ..Default::default()
        });

        coordinator.run(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(
            *events.lock(),
            vec![
                Event::Built(SignalKind::Trace),
                Event::Built(SignalKind::Metric),
                Event::Released(SignalKind::Trace),
                Event::Released(SignalKind::Metric),
            ]
        );
    }

    #[tokio::test]
    async fn test_rollback_failure_is_joined_with_cause() {
        let mut coordinator = coordinator(Script {
            fail_at: Some(SignalKind::Log),
            release_error: Some((SignalKind::Trace, "flush failed".into())),
            ..Default::default()
        });

        let err = coordinator.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            BootstrapError::ExporterConstruction {
                signal: SignalKind::Log,
                ..
            }
        ));
        let rollback = err.rollback_error().expect("rollback error kept");
        assert_eq!(rollback.signals(), vec![SignalKind::Trace]);
        assert!(err.to_string().contains("flush failed"));
    }

    #[tokio::test]
    async fn test_cancellation_mid_sequence_rolls_back() {
        let events = Events::default();
        let mut coordinator = coordinator(Script {
            cancel_after: Some(SignalKind::Trace),
            events: events.clone(),
            ..Default::default()
        });

        let err = coordinator.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::Cancelled {
                signal: SignalKind::Metric
            }
        ));
        assert_eq!(
            *events.lock(),
            vec![Event::Built(SignalKind::Trace), Event::Released(SignalKind::Trace)]
        );
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let mut coordinator = coordinator(Script::default());
        let telemetry = coordinator.run(&CancellationToken::new()).await.unwrap();

        let err = coordinator.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::AlreadyStarted {
                state: LifecycleState::Installed
            }
        ));
        telemetry.shutdown(Duration::from_secs(1)).await.unwrap();
    }
}
