//! Dispatch Tools use case
//!
//! Resolves tool-call requests against the registered function table and
//! drives the invoke/dispatch cycle to completion:
//!
//! ```text
//! AwaitingModel --(ToolCalls)--> Dispatching --> AwaitingModel
//! AwaitingModel --(Text | Structured)--> Done
//! ```
//!
//! Per-call failures (unknown tool, callable error) are recorded and fed
//! back to the model as conversation content so it can self-correct; only
//! the iteration cap is fatal.

use crate::ports::model_backend::ModelBackend;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::invoke_model::{InvokeError, ModelInvoker};
use relay_domain::{Conversation, InvocationRequest, InvocationResult, ToolCall, ToolCallRecord, ToolError, Turn};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while driving the tool loop.
#[derive(Error, Debug)]
pub enum ToolLoopError {
    #[error("tool loop exceeded {0} iterations without completing")]
    IterationsExceeded(usize),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// Use case for resolving tool calls and running the dispatch loop.
pub struct ToolDispatcher<T: ToolExecutorPort> {
    executor: Arc<T>,
}

impl<T: ToolExecutorPort> ToolDispatcher<T> {
    pub fn new(executor: Arc<T>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Arc<T> {
        &self.executor
    }

    /// Resolve one batch of tool calls.
    ///
    /// Returns the tool turns to append (one per call, in issue order, each
    /// tagged with its call id) and the per-call records. One bad call
    /// never aborts its siblings.
    pub async fn resolve(&self, calls: &[ToolCall]) -> (Vec<Turn>, Vec<ToolCallRecord>) {
        let mut records = Vec::with_capacity(calls.len());

        for call in calls {
            let record = if !self.executor.has_tool(&call.tool_name) {
                warn!("Tool call '{}' references an unregistered tool", call.tool_name);
                ToolCallRecord::failure(call.clone(), ToolError::unknown_tool(&call.tool_name))
            } else {
                match self.executor.execute(call).await {
                    Ok(output) => {
                        debug!("Tool '{}' succeeded", call.tool_name);
                        ToolCallRecord::success(call.clone(), output.to_string())
                    }
                    Err(error) => {
                        warn!("Tool '{}' failed: {}", call.tool_name, error);
                        ToolCallRecord::failure(call.clone(), error)
                    }
                }
            };
            records.push(record);
        }

        let turns = records
            .iter()
            .map(|record| Turn::tool(record.feedback_text(), record.call.id.clone()))
            .collect();

        (turns, records)
    }

    /// Drive invoke/dispatch rounds until the model produces a text or
    /// structured result, or the iteration cap is hit.
    ///
    /// Returns the terminal result together with the full conversation,
    /// including the assistant and tool turns appended along the way.
    pub async fn run_to_completion<B: ModelBackend>(
        &self,
        invoker: &ModelInvoker<B>,
        mut conversation: Conversation,
        max_iterations: usize,
    ) -> Result<(InvocationResult, Conversation), ToolLoopError> {
        let tools = self.executor.definitions();
        let mut rounds = 0_usize;

        loop {
            let request = InvocationRequest::with_tools(conversation.clone(), tools.clone());
            let result = invoker.invoke(request).await?;

            let calls = match result {
                InvocationResult::ToolCalls(calls) => calls,
                terminal => return Ok((terminal, conversation)),
            };

            rounds += 1;
            // The cap counts consecutive ToolCalls results, not dispatches
            if rounds >= max_iterations {
                warn!("Tool loop hit the {} iteration cap", max_iterations);
                return Err(ToolLoopError::IterationsExceeded(max_iterations));
            }
            debug!("Tool round {}/{}: {} call(s)", rounds, max_iterations, calls.len());

            conversation.push(Turn::assistant_tool_calls(calls.clone()));
            let (turns, _records) = self.resolve(&calls).await;
            conversation.extend(turns);
        }
    }
}
