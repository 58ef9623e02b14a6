//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod discovery;
mod output_format;

pub use discovery::DiscoveryConfig;
pub use output_format::OutputFormat;
