//! Tool execution adapters

pub mod registry;

pub use registry::ToolRegistry;
