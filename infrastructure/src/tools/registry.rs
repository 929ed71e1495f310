//! Tool Registry
//!
//! The [`ToolRegistry`] maps tool names to their definition and an async
//! callable, and implements [`ToolExecutorPort`]. It is built once at
//! wiring time and shared immutably across concurrent runs.
//!
//! # Usage
//!
//! ```ignore
//! let registry = ToolRegistry::new().register(
//!     ToolDefinition::new("get_weather", "Current weather for coordinates")
//!         .with_parameters_of::<WeatherArgs>(),
//!     |call| async move {
//!         let latitude = call
//!             .get_f64("latitude")
//!             .ok_or_else(|| ToolError::invalid_argument("latitude is required"))?;
//!         Ok(json!({"latitude": latitude, "temperature": 14.2}))
//!     },
//! );
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use relay_application::ports::tool_executor::ToolExecutorPort;
use relay_domain::{ToolCall, ToolDefinition, ToolError};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

type ToolHandler = Arc<dyn Fn(ToolCall) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

struct RegisteredTool {
    definition: ToolDefinition,
    handler: ToolHandler,
}

/// Function table implementing the tool executor port.
#[derive(Default)]
pub struct ToolRegistry {
    entries: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration under the same name replaces
    /// the earlier one.
    pub fn register<F, Fut>(mut self, definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(ToolCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let name = definition.name.clone();
        let handler: ToolHandler = Arc::new(move |call| Box::pin(handler(call)));
        self.entries.insert(name, RegisteredTool { definition, handler });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self
            .entries
            .values()
            .map(|entry| entry.definition.clone())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    fn has_tool(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let entry = self
            .entries
            .get(&call.tool_name)
            .ok_or_else(|| ToolError::unknown_tool(&call.tool_name))?;

        debug!(tool = %call.tool_name, id = %call.id, "Executing tool call");
        (entry.handler)(call.clone()).await
    }
}
