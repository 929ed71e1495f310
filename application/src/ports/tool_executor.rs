//! Tool executor port
//!
//! Registry boundary for tool calls: external collaborators register
//! `tool_name -> (argument schema, callable)`; the dispatcher only needs
//! lookup and a fallible execute returning a json-serializable value.

use async_trait::async_trait;
use relay_domain::{ToolCall, ToolDefinition, ToolError};
use serde_json::Value;

/// Port for resolving tool calls against a registered function table.
///
/// Implementations live in the infrastructure layer. The registry is
/// immutable once built and shared across concurrent pipeline runs.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Definitions of all registered tools, as offered to the model.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Check whether a tool name is registered.
    fn has_tool(&self, name: &str) -> bool;

    /// Execute a single tool call.
    ///
    /// Returns the callable's json-serializable output, or a per-call
    /// error. Never panics across the port boundary.
    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError>;
}
