//! Generation provider boundary.
//!
//! The orchestrator only sees [`Provider::generate`]: a full ordered transcript
//! goes in, a single text completion comes out. Each HTTP adapter owns its own
//! request shape and response-unwrapping rule:
//!
//! | Adapter             | Endpoint                | Text location              |
//! |---------------------|-------------------------|----------------------------|
//! | `OpenAiProvider`    | `/v1/chat/completions`  | `choices[0].message.content` |
//! | `AnthropicProvider` | `/v1/messages`          | `content[*].text` (type `text`) |

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::errors::{ConfigError, ProviderError};
use crate::transcript::Message;

/// Sampling and length parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A text-generation service accepting a running transcript.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate the next assistant message for `messages`.
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;
}

/// Supported provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key.
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-sonnet-latest",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Build the HTTP adapter selected by `config`.
pub fn build_provider(config: &Config) -> Result<Box<dyn Provider>, ProviderError> {
    let provider: Box<dyn Provider> = match config.provider {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.timeout,
        )?),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.timeout,
        )?),
    };
    Ok(provider)
}

pub(crate) fn http_client(provider: &str, timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::Network {
            provider: provider.to_string(),
            message: format!("Failed to build HTTP client: {err}"),
        })
}

pub(crate) fn map_transport_error(
    provider: &str,
    timeout: Duration,
    err: reqwest::Error,
) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            timeout,
        }
    } else {
        ProviderError::Network {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}

pub(crate) fn map_http_error(
    provider: &str,
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after,
        };
    }
    ProviderError::Http {
        provider: provider.to_string(),
        status: status.as_u16(),
        body,
    }
}

pub(crate) fn parse_retry_after(value: Option<&HeaderValue>) -> Option<Duration> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
