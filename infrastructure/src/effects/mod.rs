//! Side-effect adapters

pub mod console;

pub use console::ConsoleNotifier;
