//! Model Context Protocol settings and schema translation

pub mod schema;
pub mod settings;

pub use schema::{definition_from_schema, parameters_from_schema};
pub use settings::{McpSettings, McpSettingsError, McpTransportKind};
