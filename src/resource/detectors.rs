//! Resource attribute detectors.
//!
//! Each detector reads one source (environment, process, OS, host) and
//! returns plain key/value pairs. A detector that cannot read its source
//! reports [`DetectError::Unavailable`] and is skipped; malformed input
//! reports [`DetectError::Malformed`] and aborts the resource build.

use std::env;
use std::ffi::OsString;
use std::io;

use opentelemetry_semantic_conventions::resource::SERVICE_NAME;
use thiserror::Error;

use crate::resource::descriptor::AttributeValue;

const OTEL_RESOURCE_ATTRIBUTES: &str = "OTEL_RESOURCE_ATTRIBUTES";
const OTEL_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";

const PROCESS_PID: &str = "process.pid";
const PROCESS_EXECUTABLE_NAME: &str = "process.executable.name";
const PROCESS_EXECUTABLE_PATH: &str = "process.executable.path";
const PROCESS_COMMAND_ARGS: &str = "process.command_args";
const PROCESS_RUNTIME_NAME: &str = "process.runtime.name";
const OS_TYPE: &str = "os.type";
const HOST_ARCH: &str = "host.arch";
const HOST_NAME: &str = "host.name";

#[derive(Debug, Error)]
pub enum DetectError {
    /// The source could not be read. Attributes are simply absent.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The source was read but its content is invalid.
    #[error("malformed: {0}")]
    Malformed(String),
}

/// A source of resource attributes.
pub trait ResourceDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self) -> Result<Vec<(String, AttributeValue)>, DetectError>;
}

/// `OTEL_RESOURCE_ATTRIBUTES` and `OTEL_SERVICE_NAME` overrides.
#[derive(Debug, Clone, Default)]
pub struct EnvDetector {
    resource_attributes: Option<String>,
    service_name: Option<String>,
}

impl EnvDetector {
    pub fn new(resource_attributes: Option<String>, service_name: Option<String>) -> Self {
        Self {
            resource_attributes,
            service_name,
        }
    }

    pub fn from_env() -> Self {
        Self::new(non_empty_var(OTEL_RESOURCE_ATTRIBUTES), non_empty_var(OTEL_SERVICE_NAME))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ResourceDetector for EnvDetector {
    fn name(&self) -> &'static str {
        "env"
    }

    fn detect(&self) -> Result<Vec<(String, AttributeValue)>, DetectError> {
        let mut attributes = match &self.resource_attributes {
            Some(raw) => parse_resource_attributes(raw)?,
            None => Vec::new(),
        };

        // OTEL_SERVICE_NAME takes precedence over a service.name pair.
        if let Some(name) = &self.service_name {
            attributes.push((SERVICE_NAME.to_string(), name.trim().into()));
        }

        Ok(attributes)
    }
}

/// Parse `key1=value1,key2=value2` with percent-encoded values.
fn parse_resource_attributes(raw: &str) -> Result<Vec<(String, AttributeValue)>, DetectError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                DetectError::Malformed(format!("{OTEL_RESOURCE_ATTRIBUTES} entry `{pair}` has no `=`"))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(DetectError::Malformed(format!(
                    "{OTEL_RESOURCE_ATTRIBUTES} entry `{pair}` has an empty key"
                )));
            }
            let value = percent_decode(value.trim()).ok_or_else(|| {
                DetectError::Malformed(format!(
                    "{OTEL_RESOURCE_ATTRIBUTES} value for `{key}` is not valid percent-encoded UTF-8"
                ))
            })?;
            Ok((key.to_string(), AttributeValue::String(value)))
        })
        .collect()
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Process id, executable and runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDetector;

impl ResourceDetector for ProcessDetector {
    fn name(&self) -> &'static str {
        "process"
    }

    fn detect(&self) -> Result<Vec<(String, AttributeValue)>, DetectError> {
        let mut attributes = vec![
            (PROCESS_PID.to_string(), AttributeValue::I64(i64::from(std::process::id()))),
            (PROCESS_RUNTIME_NAME.to_string(), "rust".into()),
        ];

        if let Ok(exe) = env::current_exe() {
            if let Some(name) = exe.file_name() {
                attributes.push((
                    PROCESS_EXECUTABLE_NAME.to_string(),
                    name.to_string_lossy().into_owned().into(),
                ));
            }
            attributes.push((
                PROCESS_EXECUTABLE_PATH.to_string(),
                exe.to_string_lossy().into_owned().into(),
            ));
        }

        let args: Vec<String> = env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        if !args.is_empty() {
            attributes.push((PROCESS_COMMAND_ARGS.to_string(), args.into()));
        }

        Ok(attributes)
    }
}

/// Operating system family and CPU architecture.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDetector;

impl ResourceDetector for OsDetector {
    fn name(&self) -> &'static str {
        "os"
    }

    fn detect(&self) -> Result<Vec<(String, AttributeValue)>, DetectError> {
        Ok(vec![
            (OS_TYPE.to_string(), os_type(env::consts::OS).into()),
            (HOST_ARCH.to_string(), host_arch(env::consts::ARCH).into()),
        ])
    }
}

fn os_type(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "x86",
        "arm" => "arm32",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        other => other,
    }
}

/// Host name lookup. Unavailable in some sandboxes.
#[derive(Debug, Clone, Copy)]
pub struct HostDetector {
    lookup: fn() -> io::Result<OsString>,
}

impl HostDetector {
    pub fn new() -> Self {
        Self {
            lookup: system_hostname,
        }
    }

    /// Detector with a custom host name source.
    pub fn with_lookup(lookup: fn() -> io::Result<OsString>) -> Self {
        Self { lookup }
    }
}

#[cfg(unix)]
fn system_hostname() -> io::Result<OsString> {
    nix::unistd::gethostname().map_err(io::Error::from)
}

#[cfg(not(unix))]
fn system_hostname() -> io::Result<OsString> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "host name lookup not supported"))
}

impl Default for HostDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDetector for HostDetector {
    fn name(&self) -> &'static str {
        "host"
    }

    fn detect(&self) -> Result<Vec<(String, AttributeValue)>, DetectError> {
        let name = (self.lookup)().map_err(|e| DetectError::Unavailable(e.to_string()))?;
        let name = name
            .into_string()
            .map_err(|_| DetectError::Unavailable("host name is not valid UTF-8".to_string()))?;
        if name.is_empty() {
            return Err(DetectError::Unavailable("empty host name".to_string()));
        }
        Ok(vec![(HOST_NAME.to_string(), name.into())])
    }
}
