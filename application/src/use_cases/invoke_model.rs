//! Invoke Model use case
//!
//! Sends a conversation plus output contract to the backend and decides the
//! response into the strict [`InvocationResult`] union exactly once.
//! Retryable backend failures get bounded retry with exponential backoff;
//! schema violations are fatal, they mean the prompt or schema needs
//! revision, not another attempt.

use crate::config::ExecutionParams;
use crate::ports::model_backend::{BackendError, BackendRequest, BackendResponse, ModelBackend};
use jsonschema::JSONSchema;
use relay_domain::{InvocationRequest, InvocationResult, OutputContract, SchemaSpec, Turn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while invoking the model.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("response violates schema '{schema}': {errors:?}")]
    SchemaViolation { schema: String, errors: Vec<String> },

    #[error("schema '{schema}' failed to compile: {message}")]
    SchemaCompile { schema: String, message: String },

    #[error("backend returned an empty response")]
    EmptyResponse,
}

/// Use case for schema-constrained model invocation.
///
/// Holds no mutable state; safe to share behind an `Arc` across concurrent
/// pipeline runs. The input conversation is never mutated, sequencing the
/// result back into a transcript is the caller's job.
pub struct ModelInvoker<B: ModelBackend> {
    backend: Arc<B>,
    max_retries: u32,
    base_backoff: Duration,
}

impl<B: ModelBackend> ModelInvoker<B> {
    pub fn new(backend: Arc<B>, params: &ExecutionParams) -> Self {
        Self {
            backend,
            max_retries: params.max_retries,
            base_backoff: params.retry_base_backoff(),
        }
    }

    /// Invoke the model, retrying retryable backend errors, and decode the
    /// response according to the request's contract.
    pub async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResult, InvokeError> {
        let response = self.complete_with_retry(&request).await?;
        decode_response(&request.contract, response)
    }

    /// Invoke with a structured contract and decode the value into `T`.
    ///
    /// Convenience for callers that own both the schema and the target
    /// type; the value has already validated against the schema, so a
    /// deserialize failure is reported as a schema violation.
    pub async fn invoke_typed<T: DeserializeOwned>(
        &self,
        request: InvocationRequest,
    ) -> Result<T, InvokeError> {
        let schema_name = match &request.contract {
            OutputContract::Structured(spec) => spec.name.clone(),
            _ => String::new(),
        };

        let result = self.invoke(request).await?;
        match result.decode::<T>() {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(InvokeError::SchemaViolation {
                schema: schema_name,
                errors: vec![err.to_string()],
            }),
            None => Err(InvokeError::SchemaViolation {
                schema: schema_name,
                errors: vec!["response was not structured".to_string()],
            }),
        }
    }

    async fn complete_with_retry(
        &self,
        request: &InvocationRequest,
    ) -> Result<BackendResponse, InvokeError> {
        let mut attempt = 0_u32;

        loop {
            let backend_request = BackendRequest {
                conversation: request.conversation.clone(),
                contract: request.contract.clone(),
            };

            match self.backend.complete(backend_request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let backoff = self.base_backoff * 2_u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "Backend attempt {} failed ({}), retrying in {:?}",
                        attempt, err, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(InvokeError::Backend(err)),
            }
        }
    }
}

/// Decide the response into exactly one result variant.
fn decode_response(
    contract: &OutputContract,
    response: BackendResponse,
) -> Result<InvocationResult, InvokeError> {
    match contract {
        OutputContract::FreeText => {
            let content = response.content.ok_or(InvokeError::EmptyResponse)?;
            Ok(InvocationResult::Text(content))
        }
        OutputContract::Tools(_) => {
            if response.tool_calls.is_empty() {
                // The model declined every offered tool
                let content = response.content.ok_or(InvokeError::EmptyResponse)?;
                Ok(InvocationResult::Text(content))
            } else {
                debug!("Model requested {} tool call(s)", response.tool_calls.len());
                Ok(InvocationResult::ToolCalls(response.tool_calls))
            }
        }
        OutputContract::Structured(spec) => decode_structured(spec, response),
    }
}

fn decode_structured(
    spec: &SchemaSpec,
    response: BackendResponse,
) -> Result<InvocationResult, InvokeError> {
    let raw_content = response.content.clone();

    let value: Value = match response.structured_json {
        Some(value) => value,
        None => {
            let content = raw_content.clone().ok_or(InvokeError::EmptyResponse)?;
            serde_json::from_str(&content).map_err(|err| InvokeError::SchemaViolation {
                schema: spec.name.clone(),
                errors: vec![format!("response is not valid json: {}", err)],
            })?
        }
    };

    let validator =
        JSONSchema::compile(&spec.schema).map_err(|err| InvokeError::SchemaCompile {
            schema: spec.name.clone(),
            message: err.to_string(),
        })?;

    if let Err(violations) = validator.validate(&value) {
        let errors = violations.map(|v| v.to_string()).collect::<Vec<_>>();
        return Err(InvokeError::SchemaViolation {
            schema: spec.name.clone(),
            errors,
        });
    }

    let raw_turn = Turn::assistant(raw_content.unwrap_or_else(|| value.to_string()));
    Ok(InvocationResult::Structured { value, raw_turn })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use relay_domain::Conversation;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct Extraction {
        is_calendar_event: bool,
        confidence_score: f64,
    }

    fn request_for_extraction() -> InvocationRequest {
        InvocationRequest::structured(
            Conversation::exchange("Analyze the text", "Meet Bob at 2pm"),
            SchemaSpec::of::<Extraction>("extraction"),
        )
    }

    #[tokio::test]
    async fn structured_response_validates_and_decodes() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(
            BackendResponse::structured(json!({
                "is_calendar_event": true,
                "confidence_score": 0.9,
            })),
        )]));
        let invoker = ModelInvoker::new(backend, &ExecutionParams::default());

        let extraction: Extraction = invoker
            .invoke_typed(request_for_extraction())
            .await
            .expect("valid response");
        assert!(extraction.is_calendar_event);
        assert_eq!(extraction.confidence_score, 0.9);
    }

    #[tokio::test]
    async fn missing_required_field_is_a_schema_violation() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(
            BackendResponse::structured(json!({"is_calendar_event": true})),
        )]));
        let invoker = ModelInvoker::new(backend, &ExecutionParams::default());

        let err = invoker
            .invoke(request_for_extraction())
            .await
            .expect_err("missing field must fail decoding");
        assert!(matches!(err, InvokeError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn type_mismatch_is_a_schema_violation() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(
            BackendResponse::structured(json!({
                "is_calendar_event": "yes",
                "confidence_score": 0.9,
            })),
        )]));
        let invoker = ModelInvoker::new(backend, &ExecutionParams::default());

        let err = invoker
            .invoke(request_for_extraction())
            .await
            .expect_err("type mismatch must fail decoding");
        assert!(matches!(err, InvokeError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn unparseable_content_is_a_schema_violation() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(BackendResponse::text(
            "not json at all",
        ))]));
        let invoker = ModelInvoker::new(backend, &ExecutionParams::default());

        let err = invoker
            .invoke(request_for_extraction())
            .await
            .expect_err("non-json content must fail decoding");
        assert!(matches!(err, InvokeError::SchemaViolation { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_backend_errors_are_retried() {
        let backend = Arc::new(MockBackend::returning(vec![
            Err(BackendError::Timeout),
            Err(BackendError::Api { status: 503, message: "overloaded".into() }),
            Ok(BackendResponse::text("recovered")),
        ]));
        let invoker = ModelInvoker::new(Arc::clone(&backend), &ExecutionParams::default());

        let result = invoker
            .invoke(InvocationRequest::free_text(Conversation::exchange("s", "u")))
            .await
            .expect("third attempt succeeds");
        assert_eq!(result.as_text(), Some("recovered"));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn auth_errors_are_not_retried() {
        let backend = Arc::new(MockBackend::returning(vec![
            Err(BackendError::Auth("bad key".into())),
            Ok(BackendResponse::text("never reached")),
        ]));
        let invoker = ModelInvoker::new(Arc::clone(&backend), &ExecutionParams::default());

        let err = invoker
            .invoke(InvocationRequest::free_text(Conversation::exchange("s", "u")))
            .await
            .expect_err("auth failure is fatal");
        assert!(matches!(err, InvokeError::Backend(BackendError::Auth(_))));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn tools_contract_may_still_return_text() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(BackendResponse::text(
            "No tool needed",
        ))]));
        let invoker = ModelInvoker::new(backend, &ExecutionParams::default());

        let result = invoker
            .invoke(InvocationRequest::with_tools(
                Conversation::exchange("s", "u"),
                vec![],
            ))
            .await
            .expect("text response");
        assert_eq!(result.as_text(), Some("No tool needed"));
    }
}
