//! Model backend port
//!
//! Defines the interface for the LLM completion transport. The application
//! layer sends a conversation plus output contract and receives the raw
//! `{content?, structured_json?, tool_calls?}` shape; decoding into the
//! strict result union happens in the invoker use case, not here.

use async_trait::async_trait;
use relay_domain::{Conversation, OutputContract, ToolCall};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur at the backend boundary.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request timed out")]
    Timeout,

    #[error("backend returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Transport failures, timeouts, rate limits and server errors are
    /// worth retrying; auth failures and malformed responses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Transport(_) | BackendError::Timeout => true,
            BackendError::Api { status, .. } => *status == 429 || *status >= 500,
            BackendError::Auth(_) | BackendError::InvalidResponse(_) => false,
        }
    }
}

/// What the application sends across the backend boundary.
///
/// Schema constraints in the contract are forwarded verbatim; the backend
/// must not weaken them.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub conversation: Conversation,
    pub contract: OutputContract,
}

/// What comes back: at most one of the three shapes populated, but the
/// union is only decided by the invoker, so all three are optional here.
#[derive(Debug, Clone, Default)]
pub struct BackendResponse {
    /// Assistant text content, if any
    pub content: Option<String>,
    /// Parsed JSON payload for structured contracts, if the adapter could
    /// parse one (the invoker falls back to parsing `content` itself)
    pub structured_json: Option<Value>,
    /// Tool call requests, empty when the model declined all tools
    pub tool_calls: Vec<ToolCall>,
}

impl BackendResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn structured(value: Value) -> Self {
        Self {
            content: Some(value.to_string()),
            structured_json: Some(value),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::default()
        }
    }
}

/// Completion transport for LLM calls.
///
/// Implementations (adapters) live in the infrastructure layer. They must
/// be safe to call concurrently from multiple in-flight pipelines: `complete`
/// takes `&self` and holds no request state across calls.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(BackendError::Transport("connection reset".into()).is_retryable());
        assert!(BackendError::Timeout.is_retryable());
        assert!(BackendError::Api { status: 429, message: "rate limited".into() }.is_retryable());
        assert!(BackendError::Api { status: 503, message: "overloaded".into() }.is_retryable());

        assert!(!BackendError::Auth("bad key".into()).is_retryable());
        assert!(!BackendError::Api { status: 400, message: "bad request".into() }.is_retryable());
        assert!(!BackendError::InvalidResponse("no choices".into()).is_retryable());
    }
}
