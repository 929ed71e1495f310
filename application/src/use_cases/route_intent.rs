//! Route Intent use case
//!
//! Classifies input into one of a closed set of intents via a structured
//! invocation, then dispatches to a per-intent handler. A classification
//! below the routing threshold is forced to `Unrecognized` regardless of
//! the label the model reported, so nothing acts on a low-confidence
//! guess. The router knows nothing about handler internals; handlers are
//! polymorphic over a single capability.

use crate::ports::model_backend::ModelBackend;
use crate::use_cases::invoke_model::{InvokeError, ModelInvoker};
use crate::config::ExecutionParams;
use async_trait::async_trait;
use relay_domain::{
    Conversation, Intent, IntentSet, InvocationRequest, RouteClassification, RouteResult,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_SYSTEM_PROMPT: &str =
    "Classify the request into one of the allowed intents. \
     Use \"unrecognized\" when none of them applies. \
     Report a confidence score between 0 and 1 and a cleaned description of the request.";

/// User-facing reply produced by an intent handler.
#[derive(Debug, Clone)]
pub struct HandlerReply {
    pub message: String,
    /// Structured payload, when the handler extracted one
    pub payload: Option<Value>,
}

impl HandlerReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A per-intent handler. Receives the cleaned description and typically
/// issues its own structured invocation to extract intent-specific fields.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(&self, description: &str) -> Result<HandlerReply, InvokeError>;
}

/// Terminal outcome of routing plus dispatch.
#[derive(Debug)]
pub enum RouteOutcome {
    /// A handler ran; carries its reply
    Handled { intent: String, reply: HandlerReply },
    /// Terminal rejection: no handler was invoked
    Unrecognized(RouteResult),
}

/// Use case for intent classification and dispatch.
pub struct IntentRouter<B: ModelBackend> {
    invoker: Arc<ModelInvoker<B>>,
    intents: IntentSet,
    threshold: f64,
    system_prompt: String,
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
}

impl<B: ModelBackend> IntentRouter<B> {
    pub fn new(invoker: Arc<ModelInvoker<B>>, intents: IntentSet, params: &ExecutionParams) -> Self {
        Self {
            invoker,
            intents,
            threshold: params.routing_threshold,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            handlers: HashMap::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Register the handler for one intent label (builder pattern).
    pub fn handler(mut self, label: impl Into<String>, handler: Arc<dyn IntentHandler>) -> Self {
        self.handlers.insert(label.into(), handler);
        self
    }

    /// Classify the input without dispatching.
    pub async fn route(&self, input: &str) -> Result<RouteResult, InvokeError> {
        let schema = RouteClassification::schema_for(&self.intents);
        let conversation = Conversation::exchange(&self.system_prompt, input);

        let classification: RouteClassification = self
            .invoker
            .invoke_typed(InvocationRequest::structured(conversation, schema))
            .await?;

        if classification.confidence < self.threshold {
            info!(
                "Routing confidence {:.2} below threshold {:.2}, forcing unrecognized",
                classification.confidence, self.threshold
            );
            return Ok(RouteResult::unrecognized(
                classification.confidence,
                classification.cleaned_description,
            ));
        }

        let intent = if self.intents.contains(&classification.intent) {
            Intent::Known(classification.intent)
        } else {
            Intent::Unrecognized
        };

        Ok(RouteResult {
            intent,
            confidence: classification.confidence,
            description: classification.cleaned_description,
        })
    }

    /// Classify the input and dispatch to the matching handler.
    pub async fn run(&self, input: &str) -> Result<RouteOutcome, InvokeError> {
        let route = self.route(input).await?;

        let label = match route.intent.as_known() {
            Some(label) => label.to_string(),
            None => return Ok(RouteOutcome::Unrecognized(route)),
        };

        let handler = match self.handlers.get(&label) {
            Some(handler) => Arc::clone(handler),
            None => {
                warn!("No handler registered for intent '{}'", label);
                return Ok(RouteOutcome::Unrecognized(RouteResult {
                    intent: Intent::Unrecognized,
                    confidence: route.confidence,
                    description: route.description,
                }));
            }
        };

        info!("Dispatching intent '{}' ({:.2})", label, route.confidence);
        let reply = handler.handle(&route.description).await?;
        Ok(RouteOutcome::Handled { intent: label, reply })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_backend::BackendResponse;
    use crate::test_support::MockBackend;
    use serde_json::json;

    fn classification(intent: &str, confidence: f64) -> BackendResponse {
        BackendResponse::structured(json!({
            "intent": intent,
            "confidence": confidence,
            "cleaned_description": "schedule a meeting next tuesday",
        }))
    }

    fn router(backend: Arc<MockBackend>) -> IntentRouter<MockBackend> {
        let params = ExecutionParams::default();
        let invoker = Arc::new(ModelInvoker::new(backend, &params));
        IntentRouter::new(invoker, IntentSet::new(["new_event", "modify_event"]), &params)
    }

    struct EchoHandler;

    #[async_trait]
    impl IntentHandler for EchoHandler {
        async fn handle(&self, description: &str) -> Result<HandlerReply, InvokeError> {
            Ok(HandlerReply::new(format!("handled: {description}")))
        }
    }

    #[tokio::test]
    async fn low_confidence_is_forced_to_unrecognized() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(classification(
            "new_event",
            0.65,
        ))]));

        let route = router(backend).route("maybe a meeting?").await.expect("routed");
        assert!(route.intent.is_unrecognized());
        assert_eq!(route.confidence, 0.65);
    }

    #[tokio::test]
    async fn confident_classification_keeps_its_label() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(classification(
            "new_event",
            0.92,
        ))]));

        let route = router(backend).route("schedule a meeting").await.expect("routed");
        assert_eq!(route.intent.as_known(), Some("new_event"));
    }

    #[tokio::test]
    async fn label_outside_the_closed_set_is_unrecognized() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(classification(
            "delete_event",
            0.95,
        ))]));

        let route = router(backend).route("remove my meeting").await.expect("routed");
        assert!(route.intent.is_unrecognized());
    }

    #[tokio::test]
    async fn dispatch_hands_the_cleaned_description_to_the_handler() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(classification(
            "new_event",
            0.9,
        ))]));

        let outcome = router(backend)
            .handler("new_event", Arc::new(EchoHandler))
            .run("schedule a meeting next tuesday at 2pm")
            .await
            .expect("dispatched");

        match outcome {
            RouteOutcome::Handled { intent, reply } => {
                assert_eq!(intent, "new_event");
                assert_eq!(reply.message, "handled: schedule a meeting next tuesday");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unrecognized_never_invokes_a_handler() {
        let backend = Arc::new(MockBackend::returning(vec![Ok(classification(
            "unrecognized",
            0.9,
        ))]));

        let outcome = router(backend)
            .handler("new_event", Arc::new(EchoHandler))
            .run("what's the weather like")
            .await
            .expect("routed");
        assert!(matches!(outcome, RouteOutcome::Unrecognized(_)));
    }
}
