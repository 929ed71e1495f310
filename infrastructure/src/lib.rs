//! Infrastructure layer for relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod effects;
pub mod tools;

// Re-export commonly used types
pub use backend::{ChatBackendConfig, ChatCompletionsBackend};
pub use config::{BackendSection, ConfigLoader, FileConfig};
pub use effects::ConsoleNotifier;
pub use tools::ToolRegistry;
