//! Typed error hierarchy for docforge.
//!
//! Three top-level enums cover the three subsystems:
//! - `ConfigError`: fatal, raised before a session starts
//! - `ProviderError`: a failed round-trip to the generation provider
//! - `SessionError`: failures surfaced by the controller and session driver
//!
//! Extraction misses have no variant: a response without the expected tag
//! pair falls back to the raw text.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while resolving configuration. All are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown provider '{0}'. Valid values: openai, anthropic")]
    UnknownProvider(String),

    #[error("API key for {provider} not found. Set {env_var} in the environment or .env file")]
    MissingCredential {
        provider: String,
        env_var: &'static str,
    },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    FileParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors from a single provider round-trip.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Network { provider: String, message: String },

    #[error("{provider} request timed out after {}s", timeout.as_secs())]
    Timeout { provider: String, timeout: Duration },

    #[error("{provider} rate limit exceeded")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse { provider: String, message: String },
}

impl ProviderError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::RateLimited { .. } => true,
            ProviderError::Http { status, .. } => *status >= 500,
            ProviderError::MalformedResponse { .. } => false,
        }
    }

    /// Server-suggested delay before retrying, when one was given.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ProviderError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Errors from the phase controller and session driver.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: String,
    },

    #[error("Reviewer input failed: {0}")]
    Reviewer(#[source] anyhow::Error),

    #[error("Failed to write artifact at {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
