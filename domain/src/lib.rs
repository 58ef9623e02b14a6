//! Domain layer for ai-cli
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Feature**: a discoverable capability, either an inference provider
//!   or a tools provider
//! - **Policy**: layered settings (global / property-scoped / per-provider)
//!   resolved per axis by precedence
//! - **Tool / Toolset**: invokable functions grouped by owning provider
//! - **Session**: the conversation transcript of one interactive run

pub mod config;
pub mod feature;
pub mod mcp;
pub mod policy;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use config::{DiscoveryConfig, OutputFormat};
pub use feature::{
    Availability, DiscoveryReport, FeatureAttributes, FeatureKind, FeatureStatus, ProbeState,
};
pub use mcp::{McpSettings, McpSettingsError, McpTransportKind};
pub use policy::{EffectivePolicy, FeatureRef, FeatureSettings, Policies, PolicyAxis, Resolution};
pub use session::{Message, Role, Session, StreamEvent, ToolCallRequest};
pub use tool::{
    ArgumentError, ArgumentValue, ParameterType, Tool, ToolArguments, ToolDefinition, ToolError,
    ToolHandler, ToolParameter,
};
