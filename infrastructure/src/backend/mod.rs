//! Chat-completions backend adapter
//!
//! Implements [`ModelBackend`] against any OpenAI-compatible
//! chat-completions endpoint. The adapter performs a single attempt per
//! call; retry with backoff is the invoker's responsibility.

mod wire;

use async_trait::async_trait;
use relay_application::ports::model_backend::{
    BackendError, BackendRequest, BackendResponse, ModelBackend,
};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use wire::{into_backend_response, ChatRequest, ChatResponse};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatBackendConfig {
    /// Full URL of the chat-completions endpoint
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl ChatBackendConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP adapter for OpenAI-compatible chat-completions APIs.
pub struct ChatCompletionsBackend {
    client: reqwest::Client,
    config: ChatBackendConfig,
}

impl ChatCompletionsBackend {
    pub fn new(config: ChatBackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ModelBackend for ChatCompletionsBackend {
    async fn complete(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let body = ChatRequest::from_backend_request(&self.config.model, &request);
        debug!(
            model = %self.config.model,
            turns = request.conversation.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(BackendError::Auth(format!("status {}", status.as_u16())));
            }
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|err| {
            BackendError::InvalidResponse(format!("response body is not valid json: {}", err))
        })?;

        into_backend_response(parsed, &request.contract)
    }
}

fn extract_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: Option<Detail>,
    }
    #[derive(serde::Deserialize)]
    struct Detail {
        message: Option<String>,
    }

    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| "unknown provider error".to_string())
}
