//! Tool call value objects
//!
//! A [`ToolCall`] is a model-issued request to run a registered function.
//! Dispatch produces one [`ToolCallRecord`] per call; the record's feedback
//! text is what gets appended to the conversation as a tool turn, whether
//! the call succeeded or failed, so the model can react on the next round.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A request from the model to invoke a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Backend-assigned id, unique within one invocation result
    pub id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional f64 argument
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(|v| v.as_f64())
    }

    /// Get an optional i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// Get an optional bool argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(|v| v.as_bool())
    }
}

/// Error that occurred while resolving or executing a single tool call.
///
/// Per-call errors never abort sibling calls; they are recorded on the
/// [`ToolCallRecord`] and fed back to the model as conversation content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g. "UNKNOWN_TOOL", "EXECUTION_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// The requested tool name is not in the registry.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::new("UNKNOWN_TOOL", format!("No such tool: {}", name.into()))
    }

    /// The tool callable was found but raised during execution.
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn is_unknown_tool(&self) -> bool {
        self.code == "UNKNOWN_TOOL"
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Outcome of resolving one tool call.
///
/// Lives only for the duration of one pipeline run; consumed when its
/// feedback turn is appended to the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub call: ToolCall,
    /// Serialized output of the callable (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error information (for failed resolution or execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolCallRecord {
    pub fn success(call: ToolCall, output: impl Into<String>) -> Self {
        Self {
            call,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(call: ToolCall, error: ToolError) -> Self {
        Self {
            call,
            output: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Text appended to the conversation as this call's tool turn.
    ///
    /// Errors become a description the model can react to instead of
    /// aborting the loop.
    pub fn feedback_text(&self) -> String {
        match (&self.output, &self.error) {
            (Some(output), _) => output.clone(),
            (None, Some(error)) => format!("Tool call failed: {}", error),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_accessors() {
        let call = ToolCall::new("call_1", "get_weather")
            .with_arg("latitude", 52.52)
            .with_arg("city", "Berlin");

        assert_eq!(call.get_f64("latitude"), Some(52.52));
        assert_eq!(call.get_string("city"), Some("Berlin"));
        assert_eq!(call.require_string("city").unwrap(), "Berlin");
        assert!(call.require_string("missing").is_err());
    }

    #[test]
    fn unknown_tool_error_code() {
        let err = ToolError::unknown_tool("frobnicate");
        assert!(err.is_unknown_tool());
        assert!(err.message.contains("frobnicate"));
    }

    #[test]
    fn record_feedback_for_success_is_the_output() {
        let record = ToolCallRecord::success(ToolCall::new("c1", "get_weather"), "{\"temp\":21}");
        assert!(record.is_success());
        assert_eq!(record.feedback_text(), "{\"temp\":21}");
    }

    #[test]
    fn record_feedback_for_failure_describes_the_error() {
        let record = ToolCallRecord::failure(
            ToolCall::new("c1", "frobnicate"),
            ToolError::unknown_tool("frobnicate"),
        );
        assert!(!record.is_success());
        let feedback = record.feedback_text();
        assert!(feedback.contains("UNKNOWN_TOOL"));
        assert!(feedback.contains("frobnicate"));
    }
}
