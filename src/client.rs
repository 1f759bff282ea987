//! Generation client: one conversational round-trip at a time.

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::ProviderError;
use crate::provider::{GenerationParams, Provider};
use crate::transcript::{Message, Speaker, Transcript};

/// Sends user turns to a [`Provider`] and records each exchange.
///
/// The client exclusively owns the transcript. A user turn is only recorded
/// together with its assistant reply, so a failed call leaves the transcript
/// exactly as it was.
pub struct GenerationClient {
    provider: Box<dyn Provider>,
    params: GenerationParams,
    transcript: Transcript,
}

impl GenerationClient {
    pub fn new(provider: Box<dyn Provider>, params: GenerationParams, transcript: Transcript) -> Self {
        Self {
            provider,
            params,
            transcript,
        }
    }

    /// Send `user_content` with the full history and return the reply.
    pub async fn send(&mut self, user_content: &str) -> Result<String, ProviderError> {
        let mut request = self.transcript.snapshot().to_vec();
        request.push(Message::user(user_content));

        debug!(
            provider = self.provider.name(),
            turns = request.len(),
            prompt_chars = user_content.len(),
            "Sending user turn"
        );

        let start = Instant::now();
        let reply = match self.provider.generate(&request, &self.params).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(
                    provider = self.provider.name(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "Provider call failed; transcript left unchanged"
                );
                return Err(err);
            }
        };

        info!(
            provider = self.provider.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_chars = reply.len(),
            "Provider call complete"
        );

        self.transcript.append(Speaker::User, user_content);
        self.transcript.append(Speaker::Assistant, reply.clone());
        Ok(reply)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
