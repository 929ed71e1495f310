//! Application layer for relay
//!
//! This crate contains use cases, port definitions, and execution
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    model_backend::{BackendError, BackendRequest, BackendResponse, ModelBackend},
    side_effect::{SideEffectError, SideEffectPort},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::dispatch_tools::{ToolDispatcher, ToolLoopError};
pub use use_cases::fan_out::{FanOutError, FanOutExecutor};
pub use use_cases::invoke_model::{InvokeError, ModelInvoker};
pub use use_cases::route_intent::{HandlerReply, IntentHandler, IntentRouter, RouteOutcome};
pub use use_cases::run_pipeline::{PipelineBuilder, Stage, StageInput, StagedPipeline};
