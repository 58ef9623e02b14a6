//! Interactive chat module
//!
//! A line-based REPL over the conversation agent.

mod progress;
mod repl;

pub use progress::ReplProgress;
pub use repl::{ChatRepl, CommandOutcome};
