//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_progress;
pub mod chat_model;
pub mod feature_provider;
pub mod mcp_client;
