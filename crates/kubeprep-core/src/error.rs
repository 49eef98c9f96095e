//! Error types for kubeprep-core

use std::time::Duration;
use thiserror::Error;

/// Result type alias using kubeprep-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for kubeprep
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// A required option was not supplied and could not be derived
    #[error("Missing option: --{option}")]
    MissingOption { option: String },

    /// A value that is not one of the accepted choices
    #[error("Invalid argument: {value}. Valid values: {}", .valid.join(", "))]
    InvalidArgument { value: String, valid: Vec<String> },

    /// The kubeconfig holds no contexts at all
    #[error("No kubernetes contexts available! Try create or connect to cluster?")]
    NoContexts,

    /// A context name that is not present in the kubeconfig
    #[error("Could not find kubernetes context {name}")]
    ContextNotFound { name: String },

    /// A bounded wait expired
    #[error("Timed out after {}s waiting for {what}", .elapsed.as_secs())]
    Timeout { what: String, elapsed: Duration },

    /// The ingress namespace could not be created
    #[error("Failed to ensure the ingress namespace {namespace} is created: {message}\nIs this an RBAC issue on your cluster?")]
    NamespaceCreate { namespace: String, message: String },

    /// A required external tool is not on PATH
    #[error("{program} is not installed or not on PATH")]
    MissingExecutable { program: String },

    /// An external tool exited unsuccessfully
    #[error("{program} {args} failed: {stderr}")]
    Command {
        program: String,
        args: String,
        stderr: String,
    },

    /// The resource already exists
    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: String, name: String },

    /// The resource does not exist
    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A URL that could not be parsed
    #[error("Could not parse URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The operator prompt failed (closed terminal, interrupted input)
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Git identity is not configured
    #[error("{0}")]
    Git(String),

    /// The pinned version of a chart could not be read from the version stream
    #[error("failed to load version of chart {chart}: {source}")]
    VersionLookup {
        chart: String,
        #[source]
        source: Box<Error>,
    },

    /// All retry attempts failed
    #[error("failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create a missing option error
    pub fn missing_option(option: impl Into<String>) -> Self {
        Self::MissingOption {
            option: option.into(),
        }
    }

    /// Create an invalid argument error listing the accepted values
    pub fn invalid_argument(value: impl Into<String>, valid: Vec<String>) -> Self {
        Self::InvalidArgument {
            value: value.into(),
            valid,
        }
    }

    /// Create a timeout error
    pub fn timeout(what: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            elapsed,
        }
    }

    /// Create a command failure error
    pub fn command(program: impl Into<String>, args: &[&str], stderr: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            args: args.join(" "),
            stderr: stderr.into().trim().to_string(),
        }
    }

    /// Create a missing executable error
    pub fn missing_executable(program: impl Into<String>) -> Self {
        Self::MissingExecutable {
            program: program.into(),
        }
    }

    /// Create a version lookup error wrapping its cause
    pub fn version_lookup(chart: impl Into<String>, source: Error) -> Self {
        Self::VersionLookup {
            chart: chart.into(),
            source: Box::new(source),
        }
    }

    /// Create an already exists error
    pub fn already_exists(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the resource is already present
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::AlreadyExists { .. } => true,
            Self::Command { stderr, .. } => stderr.contains("AlreadyExists"),
            _ => false,
        }
    }

    /// Whether this error means the resource is absent
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Command { stderr, .. } => stderr.contains("NotFound"),
            _ => false,
        }
    }

    /// Whether this is a bounded-wait expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
