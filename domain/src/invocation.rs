//! Invocation contracts and the result union
//!
//! A request constrains the model's output to exactly one contract kind;
//! the response is decided once, at the invoker boundary, into a strict
//! tagged union. Downstream code matches exhaustively on the tag instead
//! of probing "whichever field the model filled in".

use crate::conversation::{Conversation, Turn};
use crate::schema::{SchemaSpec, ToolDefinition};
use crate::tool::ToolCall;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output contract of an invocation. At most one kind per request.
///
/// A `Tools` request may still produce free text: the model is allowed to
/// decline every offered tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputContract {
    /// Unconstrained text response
    FreeText,
    /// Response must be an object conforming to the schema
    Structured(SchemaSpec),
    /// The model may request calls to any of these tools
    Tools(Vec<ToolDefinition>),
}

/// A conversation plus the contract its response must satisfy.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub conversation: Conversation,
    pub contract: OutputContract,
}

impl InvocationRequest {
    pub fn free_text(conversation: Conversation) -> Self {
        Self {
            conversation,
            contract: OutputContract::FreeText,
        }
    }

    pub fn structured(conversation: Conversation, schema: SchemaSpec) -> Self {
        Self {
            conversation,
            contract: OutputContract::Structured(schema),
        }
    }

    pub fn with_tools(conversation: Conversation, tools: Vec<ToolDefinition>) -> Self {
        Self {
            conversation,
            contract: OutputContract::Tools(tools),
        }
    }
}

/// Decoded model response. Exactly one variant per invocation.
///
/// A `Structured` value has already passed validation against the schema
/// requested by its contract; a value that fails validation never reaches
/// callers (the invoker reports a schema violation instead).
#[derive(Debug, Clone)]
pub enum InvocationResult {
    /// Plain text response
    Text(String),
    /// Schema-conforming object plus the assistant turn that carried it
    Structured { value: Value, raw_turn: Turn },
    /// One or more tool call requests
    ToolCalls(Vec<ToolCall>),
}

impl InvocationResult {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InvocationResult::Text(content) => Some(content),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            InvocationResult::Structured { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match self {
            InvocationResult::ToolCalls(calls) => Some(calls),
            _ => None,
        }
    }

    pub fn is_tool_calls(&self) -> bool {
        matches!(self, InvocationResult::ToolCalls(_))
    }

    /// Decode a `Structured` value into a concrete type.
    ///
    /// Returns `None` for the other variants. Deserialization cannot fail
    /// for a value that validated against the schema derived from `T`, but
    /// the error is still surfaced rather than swallowed.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.as_structured()
            .map(|value| serde_json::from_value(value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Extraction {
        is_calendar_event: bool,
        confidence_score: f64,
    }

    #[test]
    fn structured_decodes_into_type() {
        let value = serde_json::json!({
            "is_calendar_event": true,
            "confidence_score": 0.92,
        });
        let result = InvocationResult::Structured {
            raw_turn: Turn::assistant(value.to_string()),
            value,
        };

        let decoded: Extraction = result.decode().expect("structured").expect("valid");
        assert!(decoded.is_calendar_event);
        assert_eq!(decoded.confidence_score, 0.92);
    }

    #[test]
    fn text_variant_has_no_structured_value() {
        let result = InvocationResult::Text("hello".to_string());
        assert_eq!(result.as_text(), Some("hello"));
        assert!(result.as_structured().is_none());
        assert!(result.decode::<Extraction>().is_none());
    }

    #[test]
    fn tool_calls_variant() {
        let result = InvocationResult::ToolCalls(vec![ToolCall::new("c1", "get_weather")]);
        assert!(result.is_tool_calls());
        assert_eq!(result.tool_calls().map(|c| c.len()), Some(1));
        assert!(result.as_text().is_none());
    }
}
