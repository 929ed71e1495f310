//! Configuration file loading

pub mod file_config;
pub mod loader;

pub use file_config::{BackendSection, FileConfig};
pub use loader::ConfigLoader;
