//! Presentation layer for ai-cli
//!
//! This crate contains CLI definitions, output formatters,
//! and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplProgress};
pub use cli::commands::{Cli, Command, OutputArg};
pub use output::console::ConsoleFormatter;
