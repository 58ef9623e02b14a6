//! Tool domain module
//!
//! A [`Tool`] couples a [`ToolDefinition`] (what the model sees) with a
//! [`ToolHandler`] (what runs when the model calls it). Tools are grouped
//! into *toolsets*: every tool records the name of the tools provider that
//! owns it, and toolsets are enabled as a unit.
//!
//! ```text
//! raw JSON args ──▶ ToolArguments::decode ──▶ handler ──▶ String | ToolError
//!                          │
//!                          └─ ArgumentError (typed, before invocation)
//! ```
//!
//! Local tools built with [`Tool::local`] decode their arguments against the
//! definition. Remote tools pass the raw JSON straight through to the
//! server that owns the schema.

pub mod arguments;
pub mod entities;
pub mod error;

pub use arguments::{ArgumentError, ArgumentValue, ToolArguments};
pub use entities::{ParameterType, Tool, ToolDefinition, ToolHandler, ToolParameter};
pub use error::ToolError;
