//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::TelemetryConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<TelemetryConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without semantic checks, for callers that apply
/// overrides before validating.
pub fn read_config(path: &Path) -> Result<TelemetryConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: TelemetryConfig = toml::from_str(&content)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ExporterKind;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_config(
            r#"
            [service]
            name = "checkout"
            version = "2.1.0"
            environment = "staging"

            [service.attributes]
            "team" = "payments"

            [exporter]
            kind = "http"
            address = "otel-collector:4318"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.service.name, "checkout");
        assert_eq!(config.service.attributes["team"], "payments");
        assert_eq!(config.exporter.kind, ExporterKind::Buffered);
    }

    #[test]
    fn test_load_reports_validation_failures() {
        let file = write_config(
            r#"
            [exporter]
            kind = "streaming"
            address = ""
            "#,
        );

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("requires a collector address"));

        let unchecked = read_config(file.path()).unwrap();
        assert_eq!(unchecked.exporter.kind, ExporterKind::Streaming);
    }

    #[test]
    fn test_load_rejects_unknown_exporter() {
        let file = write_config("[exporter]\nkind = \"carrier-pigeon\"\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_sample_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/telemetry.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.exporter.kind, ExporterKind::Streaming);
        assert_eq!(config.metrics.interval_ms, 3000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/telemetry.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
