//! Anthropic Messages API adapter.
//!
//! The Messages API takes the system prompt as a top-level `system` field and
//! only `user`/`assistant` turns in `messages`, so the transcript is split
//! before sending.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{
    GenerationParams, Provider, http_client, map_http_error, map_transport_error,
    parse_retry_after,
};
use crate::errors::ProviderError;
use crate::transcript::{Message, Role};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(PROVIDER, timeout)?,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let body = build_request(messages, params);
        debug!(
            provider = PROVIDER,
            model = %params.model,
            messages = body.messages.len(),
            "Sending messages request"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| map_transport_error(PROVIDER, self.timeout, err))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Anthropic error body".to_string());
            return Err(map_http_error(PROVIDER, status, body_text, retry_after));
        }

        let text = response
            .text()
            .await
            .map_err(|err| map_transport_error(PROVIDER, self.timeout, err))?;
        debug!(
            provider = PROVIDER,
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_bytes = text.len(),
            "Messages response received"
        );
        parse_response(&text)
    }
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

fn build_request<'a>(messages: &'a [Message], params: &'a GenerationParams) -> AnthropicRequest<'a> {
    let mut system = None;
    let mut turns = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            Role::System => system = Some(msg.content.as_str()),
            Role::User => turns.push(AnthropicMessage {
                role: "user",
                content: &msg.content,
            }),
            Role::Assistant => turns.push(AnthropicMessage {
                role: "assistant",
                content: &msg.content,
            }),
        }
    }

    AnthropicRequest {
        model: &params.model,
        messages: turns,
        max_tokens: params.max_tokens,
        temperature: params.temperature,
        system,
    }
}

/// Concatenate every `text` content block.
fn parse_response(body: &str) -> Result<String, ProviderError> {
    let parsed: AnthropicResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::MalformedResponse {
            provider: PROVIDER.to_string(),
            message: format!("invalid JSON: {err}"),
        })?;

    let content: String = parsed
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect();

    if content.is_empty() {
        return Err(ProviderError::MalformedResponse {
            provider: PROVIDER.to_string(),
            message: "response has no text content blocks".to_string(),
        });
    }
    Ok(content)
}
