//! Resource descriptor shared by every signal pipeline.

use std::collections::BTreeMap;

use opentelemetry::{Array, KeyValue, StringValue, Value};
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use opentelemetry_semantic_conventions::SCHEMA_URL;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::resource::detectors::{
    DetectError, EnvDetector, HostDetector, OsDetector, ProcessDetector, ResourceDetector,
};

/// `deployment.environment.name` is still experimental in the semantic
/// conventions crate.
pub const DEPLOYMENT_ENVIRONMENT_NAME: &str = "deployment.environment.name";

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Bool(bool),
    I64(i64),
    F64(f64),
    StringArray(Vec<String>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::I64(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::F64(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        AttributeValue::StringArray(value)
    }
}

impl From<AttributeValue> for Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::String(s) => Value::from(s),
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::I64(i) => Value::I64(i),
            AttributeValue::F64(f) => Value::F64(f),
            AttributeValue::StringArray(items) => Value::Array(Array::String(
                items.into_iter().map(StringValue::from).collect(),
            )),
        }
    }
}

/// A detector failed in a way that must abort startup.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{detector} detector failed: {reason}")]
    Detector {
        detector: &'static str,
        reason: String,
    },
}

/// Immutable description of the running service instance.
///
/// Built once at startup and shared read-only by the trace, metric and log
/// pipelines.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    attributes: BTreeMap<String, AttributeValue>,
    schema_url: Option<String>,
}

impl ResourceDescriptor {
    pub fn builder() -> ResourceBuilder {
        ResourceBuilder::default()
    }

    /// Descriptor for the configured service with every standard detector.
    pub fn from_service_config(service: &ServiceConfig) -> Result<Self, ResourceError> {
        let mut builder = Self::builder()
            .service_name(service.name.clone())
            .service_version(service.version.clone())
            .deployment_environment(service.environment.clone());
        for (key, value) in &service.attributes {
            builder = builder.attribute(key.clone(), value.clone());
        }
        builder.with_standard_detectors().build()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }

    pub fn service_name(&self) -> Option<&str> {
        self.get(SERVICE_NAME).and_then(AttributeValue::as_str)
    }

    /// Convert into the SDK resource attached to each provider.
    pub fn to_sdk_resource(&self) -> Resource {
        let attributes = self
            .attributes
            .iter()
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()));

        match &self.schema_url {
            Some(url) => Resource::builder_empty()
                .with_schema_url(attributes, url.clone())
                .build(),
            None => Resource::builder_empty().with_attributes(attributes).build(),
        }
    }
}

/// Collects explicit attributes and detectors, then merges them in order.
///
/// Explicit attributes go in first; each detector's output is layered on top
/// in registration order, so later sources win for duplicate keys.
pub struct ResourceBuilder {
    explicit: Vec<(String, AttributeValue)>,
    schema_url: Option<String>,
    detectors: Vec<Box<dyn ResourceDetector>>,
}

impl Default for ResourceBuilder {
    fn default() -> Self {
        Self {
            explicit: Vec::new(),
            schema_url: Some(SCHEMA_URL.to_string()),
            detectors: Vec::new(),
        }
    }
}

impl ResourceBuilder {
    pub fn service_name(self, name: impl Into<String>) -> Self {
        self.attribute(SERVICE_NAME, name.into())
    }

    pub fn service_version(self, version: impl Into<String>) -> Self {
        self.attribute(SERVICE_VERSION, version.into())
    }

    pub fn deployment_environment(self, environment: impl Into<String>) -> Self {
        self.attribute(DEPLOYMENT_ENVIRONMENT_NAME, environment.into())
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.explicit.push((key.into(), value.into()));
        self
    }

    /// Override the schema URL; `None` drops it.
    pub fn schema_url(mut self, url: Option<String>) -> Self {
        self.schema_url = url;
        self
    }

    pub fn detector(mut self, detector: impl ResourceDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Environment overrides, then process, OS and host detection.
    pub fn with_standard_detectors(self) -> Self {
        self.detector(EnvDetector::from_env())
            .detector(ProcessDetector)
            .detector(OsDetector)
            .detector(HostDetector::new())
    }

    pub fn build(self) -> Result<ResourceDescriptor, ResourceError> {
        let mut attributes: BTreeMap<String, AttributeValue> = self.explicit.into_iter().collect();

        for detector in &self.detectors {
            match detector.detect() {
                Ok(detected) => attributes.extend(detected),
                Err(DetectError::Unavailable(reason)) => {
                    tracing::debug!(
                        detector = detector.name(),
                        reason = %reason,
                        "Resource detector unavailable, skipping"
                    );
                }
                Err(DetectError::Malformed(reason)) => {
                    return Err(ResourceError::Detector {
                        detector: detector.name(),
                        reason,
                    });
                }
            }
        }

        Ok(ResourceDescriptor {
            attributes,
            schema_url: self.schema_url,
        })
    }
}
