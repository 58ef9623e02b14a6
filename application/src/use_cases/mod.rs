//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod discover_features;
pub mod run_agent;
