//! OpenAI Chat Completions adapter.

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
use crate::transcript::Message;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "openai";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiProvider {
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
impl Provider for OpenAiProvider {
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
            messages = messages.len(),
            "Sending chat completion request"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
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
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
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
            "Chat completion received"
        );
        parse_response(&text)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn build_request<'a>(
    messages: &'a [Message],
    params: &'a GenerationParams,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model: &params.model,
        messages,
        temperature: params.temperature,
        max_tokens: params.max_tokens,
    }
}

/// Unwrap `choices[0].message.content`.
fn parse_response(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::MalformedResponse {
            provider: PROVIDER.to_string(),
            message: format!("invalid JSON: {err}"),
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: PROVIDER.to_string(),
            message: "response has no choices[0].message.content".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Role;

    fn params() -> GenerationParams {
        GenerationParams {
            model: "gpt-4o-mini".into(),
            temperature: 0.2,
            max_tokens: 3000,
        }
    }

    #[test]
    fn request_carries_full_transcript_including_system() {
        let messages = vec![
            Message::new(Role::System, "sys"),
            Message::user("hello"),
            Message::assistant("hi"),
            Message::user("outline please"),
        ];
        let params = params();
        let json = serde_json::to_value(build_request(&messages, &params)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 3000);
        let sent = json["messages"].as_array().unwrap();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0]["role"], "system");
        assert_eq!(sent[3]["content"], "outline please");
    }

    #[test]
    fn parse_response_takes_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "<OUTLINE>x</OUTLINE>"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ]
        }"#;
        assert_eq!(parse_response(body).unwrap(), "<OUTLINE>x</OUTLINE>");
    }

    #[test]
    fn parse_response_without_choices_is_malformed() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[test]
    fn parse_response_with_null_content_is_malformed() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert!(matches!(
            parse_response(body),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn parse_response_rejects_invalid_json() {
        let err = parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
        assert!(!err.is_retryable());
    }
}
