//! Calendar assistant demo workflows
//!
//! Each submodule wires one workflow pattern end to end: prompt chaining,
//! intent routing, parallel validation, and the weather tool loop.

pub mod chaining;
pub mod context;
pub mod routing;
pub mod schemas;
pub mod validation;
pub mod weather;
