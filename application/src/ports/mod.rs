//! Ports (interfaces) the application layer depends on.
//!
//! Adapters implementing these traits live in the infrastructure layer.

pub mod model_backend;
pub mod side_effect;
pub mod tool_executor;

pub use model_backend::{BackendError, BackendRequest, BackendResponse, ModelBackend};
pub use side_effect::{SideEffectError, SideEffectPort};
pub use tool_executor::ToolExecutorPort;
