//! Telemetry bootstrap daemon.
//!
//! ```text
//! config file + CLI overrides
//!     → validate
//!     → resource descriptor
//!     → bootstrap (trace → metric → log)
//!     → install globals + tracing subscriber
//!     → wait for SIGINT/SIGTERM
//!     → aggregate shutdown
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use telemetry_bootstrap::config::{read_config, validate_config, ConfigError, TelemetryConfig};
use telemetry_bootstrap::lifecycle::{bootstrap, spawn_signal_listener, ShutdownError, Telemetry};
use telemetry_bootstrap::observability::logging;
use telemetry_bootstrap::{ExporterKind, ResourceDescriptor};

#[derive(Debug, Parser)]
#[command(name = "telemetry-bootstrap", version, about = "Bring up OpenTelemetry pipelines for a service")]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exporter transport: streaming (grpc), buffered (http) or local (stdout)
    #[arg(short, long)]
    exporter: Option<ExporterKind>,

    /// Collector address as host:port
    #[arg(short, long)]
    address: Option<String>,

    #[arg(long)]
    service_name: Option<String>,

    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<TelemetryConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => TelemetryConfig::default(),
        };

        if let Some(kind) = self.exporter {
            config.exporter.kind = kind;
        }
        if let Some(address) = self.address {
            config.exporter.address = address;
        }
        if let Some(name) = self.service_name {
            config.service.name = name;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Cli::parse().into_config()?;

    // Console only until the pipelines exist; the global subscriber comes after.
    let startup_log = tracing::subscriber::set_default(logging::console_subscriber(&config.logging));

    let resource = ResourceDescriptor::from_service_config(&config.service)?;
    let cancel = CancellationToken::new();
    let listener = spawn_signal_listener(cancel.clone());

    let telemetry = match bootstrap(&cancel, &config.pipeline_settings(), &resource).await {
        Ok(telemetry) => telemetry,
        Err(e) => {
            tracing::error!(error = %e, "Telemetry bootstrap failed");
            cancel.cancel();
            return Err(e.into());
        }
    };
    drop(startup_log);

    // From here on every exit path runs the aggregate shutdown.
    let outcome = run(&config, &resource, &telemetry, &cancel).await;

    cancel.cancel();
    if let Err(e) = listener.await {
        tracing::warn!(error = %e, "Signal listener task failed");
    }

    tracing::info!(timeout = ?config.shutdown.timeout(), "Shutting down telemetry");
    let shutdown = telemetry.shutdown(config.shutdown.timeout()).await;
    join_outcome(outcome, shutdown)?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run(
    config: &TelemetryConfig,
    resource: &ResourceDescriptor,
    telemetry: &Telemetry,
    cancel: &CancellationToken,
) -> Result<(), BoxError> {
    telemetry.install_global();
    logging::init(&config.logging, Some(telemetry))?;

    tracing::info!(
        service = resource.service_name().unwrap_or("unknown"),
        exporter = %config.exporter.kind,
        address = %config.exporter.address,
        "Telemetry running, waiting for shutdown signal"
    );

    cancel.cancelled().await;
    Ok(())
}

/// Keep both the run error and the shutdown error when both happen.
fn join_outcome(outcome: Result<(), BoxError>, shutdown: Result<(), ShutdownError>) -> Result<(), BoxError> {
    match (outcome, shutdown) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) => Err(e),
        (Ok(()), Err(shutdown)) => Err(format!("telemetry shutdown incomplete:\n{shutdown}").into()),
        (Err(e), Err(shutdown)) => Err(format!("{e}\ntelemetry shutdown incomplete:\n{shutdown}").into()),
    }
}
