//! Use cases orchestrating domain logic through the ports

pub mod dispatch_tools;
pub mod fan_out;
pub mod invoke_model;
pub mod route_intent;
pub mod run_pipeline;

pub use dispatch_tools::{ToolDispatcher, ToolLoopError};
pub use fan_out::{FanOutError, FanOutExecutor};
pub use invoke_model::{InvokeError, ModelInvoker};
pub use route_intent::{HandlerReply, IntentHandler, IntentRouter, RouteOutcome};
pub use run_pipeline::{PipelineBuilder, Stage, StageInput, StagedPipeline};
