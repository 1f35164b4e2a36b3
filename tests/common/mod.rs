//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::net::TcpListener;
use std::time::Duration;

use telemetry_bootstrap::{ExporterKind, PipelineSettings, ResourceDescriptor};

/// An address nothing listens on.
pub fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

/// Settings with short timeouts so failures surface quickly.
pub fn settings(kind: ExporterKind, address: &str) -> PipelineSettings {
    let mut settings = PipelineSettings::new(kind, address);
    settings.exporter.connect_timeout_ms = 500;
    settings.rollback_timeout = Duration::from_secs(2);
    settings
}

pub fn resource() -> ResourceDescriptor {
    ResourceDescriptor::builder()
        .service_name("integration-test")
        .service_version("0.0.0")
        .deployment_environment("test")
        .build()
        .unwrap()
}
