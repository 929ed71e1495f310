//! Domain layer for relay
//!
//! This crate contains the core types and pure logic of the orchestration
//! core. It has no dependencies on infrastructure or transport concerns.
//!
//! # Core Concepts
//!
//! ## Structured invocation
//!
//! A model call constrained by an [`OutputContract`]: free text, an object
//! conforming to a [`SchemaSpec`], or a set of tool definitions. The
//! response is a strict tagged union ([`InvocationResult`]) decided once at
//! the invoker boundary.
//!
//! ## Gates
//!
//! A [`GatePolicy`] is a declarative pass/fail checkpoint between pipeline
//! stages; evaluation is pure and total, collecting a reason for every
//! failing predicate.

pub mod conversation;
pub mod gate;
pub mod invocation;
pub mod pipeline;
pub mod route;
pub mod schema;
pub mod tool;

// Re-export commonly used types
pub use conversation::{Conversation, Role, Turn};
pub use gate::{Comparator, GateDecision, GatePolicy, GatePredicate};
pub use invocation::{InvocationRequest, InvocationResult, OutputContract};
pub use pipeline::{PipelineContext, PipelineOutcome, StageFailure};
pub use route::{Intent, IntentSet, RouteClassification, RouteResult};
pub use schema::{SchemaSpec, ToolDefinition};
pub use tool::{ToolCall, ToolCallRecord, ToolError};
