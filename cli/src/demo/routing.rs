//! Routing demo: classify a request as new_event or modify_event and
//! dispatch to the matching extraction handler.

use crate::demo::context::with_date_context;
use crate::demo::schemas::{ModifyEventDetails, NewEventDetails};
use anyhow::Result;
use async_trait::async_trait;
use relay_application::{
    HandlerReply, IntentHandler, IntentRouter, InvokeError, ModelBackend, ModelInvoker,
    RouteOutcome,
};
use relay_application::config::ExecutionParams;
use relay_domain::{Conversation, IntentSet, InvocationRequest, SchemaSpec};
use std::sync::Arc;

const NEW_EVENT_PROMPT: &str =
    "Extract details for creating a new calendar event. Use ISO 8601 for the date.";
const MODIFY_EVENT_PROMPT: &str =
    "Extract details for modifying an existing calendar event.";

struct NewEventHandler<B: ModelBackend> {
    invoker: Arc<ModelInvoker<B>>,
}

#[async_trait]
impl<B: ModelBackend> IntentHandler for NewEventHandler<B> {
    async fn handle(&self, description: &str) -> Result<HandlerReply, InvokeError> {
        let request = InvocationRequest::structured(
            Conversation::exchange(with_date_context(NEW_EVENT_PROMPT), description),
            SchemaSpec::of::<NewEventDetails>("new_event_details"),
        );
        let details: NewEventDetails = self.invoker.invoke_typed(request).await?;

        let message = format!(
            "Created '{}' on {} for {} minute(s) with {}.",
            details.name,
            details.date,
            details.duration_minutes,
            if details.participants.is_empty() {
                "no participants".to_string()
            } else {
                details.participants.join(", ")
            },
        );
        let payload = serde_json::to_value(&details)
            .map_err(|err| InvokeError::SchemaViolation {
                schema: "new_event_details".to_string(),
                errors: vec![err.to_string()],
            })?;
        Ok(HandlerReply::new(message).with_payload(payload))
    }
}

struct ModifyEventHandler<B: ModelBackend> {
    invoker: Arc<ModelInvoker<B>>,
}

#[async_trait]
impl<B: ModelBackend> IntentHandler for ModifyEventHandler<B> {
    async fn handle(&self, description: &str) -> Result<HandlerReply, InvokeError> {
        let request = InvocationRequest::structured(
            Conversation::exchange(with_date_context(MODIFY_EVENT_PROMPT), description),
            SchemaSpec::of::<ModifyEventDetails>("modify_event_details"),
        );
        let details: ModifyEventDetails = self.invoker.invoke_typed(request).await?;

        let message = format!(
            "Updated '{}': {} change(s) applied.",
            details.event_identifier,
            details.changes.len(),
        );
        let payload = serde_json::to_value(&details)
            .map_err(|err| InvokeError::SchemaViolation {
                schema: "modify_event_details".to_string(),
                errors: vec![err.to_string()],
            })?;
        Ok(HandlerReply::new(message).with_payload(payload))
    }
}

pub fn build_router<B: ModelBackend + 'static>(
    invoker: Arc<ModelInvoker<B>>,
    params: &ExecutionParams,
) -> IntentRouter<B> {
    let intents = IntentSet::new(["new_event", "modify_event"]);

    IntentRouter::new(Arc::clone(&invoker), intents, params)
        .handler(
            "new_event",
            Arc::new(NewEventHandler {
                invoker: Arc::clone(&invoker),
            }),
        )
        .handler("modify_event", Arc::new(ModifyEventHandler { invoker }))
}

pub async fn run<B: ModelBackend + 'static>(
    invoker: Arc<ModelInvoker<B>>,
    params: &ExecutionParams,
    input: &str,
) -> Result<()> {
    let router = build_router(invoker, params);

    match router.run(input).await? {
        RouteOutcome::Handled { intent, reply } => {
            println!("[{}] {}", intent, reply.message);
        }
        RouteOutcome::Unrecognized(route) => {
            println!(
                "Sorry, I can only create or modify calendar events (confidence {:.2}).",
                route.confidence
            );
        }
    }

    Ok(())
}
