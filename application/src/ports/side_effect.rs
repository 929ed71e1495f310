//! Side-effect collaborator port
//!
//! Calendar inserts, email sends and human-in-the-loop prompts are
//! external collaborators. The pipeline treats each as an opaque, fallible
//! operation; whether a failure is fatal is decided per stage, not here.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors a side-effect collaborator can report.
#[derive(Error, Debug)]
pub enum SideEffectError {
    #[error("side effect '{name}' failed: {message}")]
    Failed { name: String, message: String },

    #[error("side effect '{name}' rejected by the user")]
    Declined { name: String },
}

impl SideEffectError {
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// An injected external operation invoked by a pipeline stage.
///
/// The core never blocks on interactive input or talks to a provider API
/// directly; it hands the stage payload to an implementation of this port.
#[async_trait]
pub trait SideEffectPort: Send + Sync {
    /// Short name used in logs and failure messages.
    fn name(&self) -> &str;

    async fn execute(&self, payload: &Value) -> Result<(), SideEffectError>;
}
