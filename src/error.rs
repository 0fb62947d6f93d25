//! Error types for pipeseal.
//!
//! One enum per failure class. Each class maps onto a [`FailureKind`] so the
//! sync report can name what went wrong without carrying the error itself.

use serde::Serialize;
use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    KeyResolution(#[from] KeyResolutionError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(String),

    #[error("environment variable {var} is empty")]
    EmptyVar { var: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read manifest {path}: {source}")]
    ReadManifest {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("secret name cannot be empty")]
    EmptyName,

    #[error("invalid secret name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("duplicate {what}: {name}")]
    Duplicate { what: &'static str, name: String },

    #[error("value for {0} is empty")]
    EmptyValue(String),
}

/// Failure to obtain an environment's public key.
#[derive(Error, Debug)]
pub enum KeyResolutionError {
    #[error("environment '{environment}' not found in remote store")]
    NotFound { environment: String },

    #[error("unauthorized to read key for '{environment}' (HTTP {status})")]
    Unauthorized { environment: String, status: u16 },

    #[error("store refused key request for '{environment}' (HTTP {status}): {body}")]
    Rejected {
        environment: String,
        status: u16,
        body: String,
    },

    #[error("invalid public key for '{environment}': {source}")]
    InvalidKey {
        environment: String,
        #[source]
        source: EncodingError,
    },

    #[error("key request for '{environment}' failed: {source}")]
    Transport {
        environment: String,
        #[source]
        source: TransportError,
    },
}

/// A dynamic value lookup produced no usable answer.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("no resource matches alias {alias}")]
    NoMatch { alias: String },

    #[error("alias {alias} is ambiguous: matched {}", .ids.join(", "))]
    Ambiguous { alias: String, ids: Vec<String> },

    #[error("resolved value for {0} is empty")]
    Empty(String),

    #[error("DOMAIN_NAME is required to resolve {0}")]
    MissingDomain(String),
}

/// Network or provider API failure. Retryable.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("`{program}` failed: {reason}")]
    Command { program: String, reason: String },

    #[error("`{program}` timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider error: {0}")]
    Provider(String),
}

/// Malformed key material. Never retried.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("public key must be {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    #[error("sealing failed")]
    Seal,

    #[error("ciphertext could not be opened")]
    Open,

    #[error("plaintext is not UTF-8")]
    Utf8,
}

/// The store refused or never received an upload.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("key id {key_id} was rejected as stale")]
    StaleKey { key_id: String },

    #[error("store rejected {secret} (HTTP {status}): {body}")]
    Rejected {
        secret: String,
        status: u16,
        body: String,
    },

    #[error("upload of {secret} failed: {source}")]
    Transport {
        secret: String,
        #[source]
        source: TransportError,
    },
}

/// Machine-readable failure class used in sync reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Config,
    KeyResolution,
    Resolution,
    Transport,
    Encoding,
    Publish,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Config => "config",
            Self::KeyResolution => "key_resolution",
            Self::Resolution => "resolution",
            Self::Transport => "transport",
            Self::Encoding => "encoding",
            Self::Publish => "publish",
        };
        f.write_str(s)
    }
}

impl Error {
    /// Failure class for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Io(_) => FailureKind::Config,
            Self::KeyResolution(_) => FailureKind::KeyResolution,
            Self::Resolution(_) => FailureKind::Resolution,
            Self::Transport(_) => FailureKind::Transport,
            Self::Encoding(_) => FailureKind::Encoding,
            Self::Publish(_) => FailureKind::Publish,
        }
    }

    /// Whether a single retry after backoff is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::KeyResolution(KeyResolutionError::Transport { .. })
                | Self::Publish(PublishError::Transport { .. })
        )
    }

    /// Whether the store rejected the key id used for sealing.
    pub fn is_stale_key(&self) -> bool {
        matches!(self, Self::Publish(PublishError::StaleKey { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
