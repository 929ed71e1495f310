//! Chat-completions wire format
//!
//! Request and response shapes for OpenAI-compatible chat-completions
//! endpoints, plus the mapping to and from the application-layer types.

use relay_application::ports::model_backend::{BackendError, BackendRequest, BackendResponse};
use relay_domain::{OutputContract, Role, ToolCall, Turn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
    pub temperature: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls requested by an assistant turn, replayed so the
    /// following `role:"tool"` messages have a request to answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<Value>>,
}

impl ChatMessage {
    fn from_turn(turn: &Turn) -> Self {
        let tool_calls = if turn.tool_calls.is_empty() {
            None
        } else {
            Some(turn.tool_calls.iter().map(wire_tool_call).collect())
        };

        Self {
            role: match turn.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            },
            content: (!turn.content.is_empty() || tool_calls.is_none())
                .then(|| turn.content.clone()),
            tool_call_id: turn.tool_call_id.clone(),
            tool_calls,
        }
    }
}

fn wire_tool_call(call: &ToolCall) -> Value {
    let arguments =
        serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".to_string());
    json!({
        "id": call.id,
        "type": "function",
        "function": {
            "name": call.tool_name,
            "arguments": arguments,
        },
    })
}

impl ChatRequest {
    pub fn from_backend_request(model: &str, request: &BackendRequest) -> Self {
        let messages = request
            .conversation
            .turns()
            .iter()
            .map(ChatMessage::from_turn)
            .collect();

        let (tools, response_format) = match &request.contract {
            OutputContract::FreeText => (None, None),
            OutputContract::Structured(spec) => (
                None,
                Some(json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": spec.name,
                        "schema": spec.schema,
                        "strict": true,
                    },
                })),
            ),
            OutputContract::Tools(definitions) => (
                Some(
                    definitions
                        .iter()
                        .map(|def| {
                            json!({
                                "type": "function",
                                "function": {
                                    "name": def.name,
                                    "description": def.description,
                                    "parameters": def.parameters,
                                },
                            })
                        })
                        .collect(),
                ),
                None,
            ),
        };

        Self {
            model: model.to_string(),
            messages,
            tools,
            response_format,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireToolCall {
    pub id: String,
    pub function: WireFunction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFunction {
    pub name: String,
    /// Arguments arrive as a JSON-encoded string
    pub arguments: String,
}

/// Map a parsed chat response onto the port's response shape.
///
/// For structured contracts the content is eagerly parsed so that callers
/// receive `structured_json` instead of raw text.
pub(crate) fn into_backend_response(
    response: ChatResponse,
    contract: &OutputContract,
) -> Result<BackendResponse, BackendError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidResponse("response has no choices".to_string()))?;

    if !choice.message.tool_calls.is_empty() {
        let calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|wire| {
                let arguments: HashMap<String, Value> = serde_json::from_str(&wire.function.arguments)
                    .map_err(|err| {
                        BackendError::InvalidResponse(format!(
                            "tool call '{}' has malformed arguments: {}",
                            wire.function.name, err
                        ))
                    })?;
                Ok(ToolCall {
                    id: wire.id,
                    tool_name: wire.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>, BackendError>>()?;
        return Ok(BackendResponse::tool_calls(calls));
    }

    let content = choice
        .message
        .content
        .ok_or_else(|| BackendError::InvalidResponse("choice has neither content nor tool calls".to_string()))?;

    if matches!(contract, OutputContract::Structured(_)) {
        let value: Value = serde_json::from_str(&content).map_err(|err| {
            BackendError::InvalidResponse(format!("structured content is not valid json: {}", err))
        })?;
        return Ok(BackendResponse::structured(value));
    }

    Ok(BackendResponse::text(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::{Conversation, SchemaSpec, ToolDefinition};

    #[test]
    fn structured_contract_sets_response_format() {
        let request = BackendRequest {
            conversation: Conversation::exchange("sys", "usr"),
            contract: OutputContract::Structured(SchemaSpec::new(
                "extraction",
                json!({"type": "object"}),
            )),
        };
        let wire = ChatRequest::from_backend_request("gpt-4o", &request);

        let format = wire.response_format.expect("response_format");
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "extraction");
        assert!(wire.tools.is_none());
    }

    #[test]
    fn tools_contract_lists_function_definitions() {
        let request = BackendRequest {
            conversation: Conversation::exchange("sys", "usr"),
            contract: OutputContract::Tools(vec![ToolDefinition::new(
                "get_weather",
                "Current weather for a location",
            )]),
        };
        let wire = ChatRequest::from_backend_request("gpt-4o", &request);

        let tools = wire.tools.expect("tools");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["function"]["name"], "get_weather");
        assert!(wire.response_format.is_none());
    }

    #[test]
    fn replayed_tool_round_keeps_request_and_answer_paired() {
        let mut conversation = Conversation::exchange("sys", "What's the weather in Paris?");
        conversation.push(Turn::assistant_tool_calls(vec![ToolCall::new(
            "call_1",
            "get_weather",
        )
        .with_arg("latitude", json!(48.85))]));
        conversation.push(Turn::tool("{\"temperature\": 14.2}", "call_1"));

        let request = BackendRequest {
            conversation,
            contract: OutputContract::FreeText,
        };
        let wire = ChatRequest::from_backend_request("gpt-4o", &request);
        let body = serde_json::to_value(&wire).expect("serialize");

        let assistant = &body["messages"][2];
        assert_eq!(assistant["role"], "assistant");
        assert_eq!(assistant["content"], Value::Null);
        assert_eq!(assistant["tool_calls"][0]["id"], "call_1");
        assert_eq!(assistant["tool_calls"][0]["function"]["name"], "get_weather");
        let arguments = assistant["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .expect("json-encoded arguments");
        assert!(arguments.contains("48.85"));

        let tool = &body["messages"][3];
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_1");
    }

    #[test]
    fn tool_call_arguments_parse_from_json_string() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_weather",
                            "arguments": "{\"latitude\": 48.85, \"longitude\": 2.35}",
                        },
                    }],
                },
            }],
        }))
        .expect("parse");

        let mapped = into_backend_response(response, &OutputContract::FreeText).expect("map");
        let calls = mapped.tool_calls;
        assert_eq!(calls[0].tool_name, "get_weather");
        assert_eq!(calls[0].arguments["latitude"], json!(48.85));
    }

    #[test]
    fn structured_content_is_parsed_eagerly() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"content": "{\"confidence\": 0.9}", "tool_calls": []},
            }],
        }))
        .expect("parse");

        let contract =
            OutputContract::Structured(SchemaSpec::new("extraction", json!({"type": "object"})));
        let mapped = into_backend_response(response, &contract).expect("map");
        assert_eq!(mapped.structured_json, Some(json!({"confidence": 0.9})));
    }

    #[test]
    fn missing_choices_is_an_invalid_response() {
        let response = ChatResponse { choices: vec![] };
        let err = into_backend_response(response, &OutputContract::FreeText).unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }
}
