//! Discoverable features
//!
//! A *feature* is anything that is discovered at startup and gated by
//! policy: an inference provider or a tools provider.

pub mod attributes;
pub mod report;

pub use attributes::{Availability, FeatureAttributes, FeatureKind, ProbeState};
pub use report::{DiscoveryReport, FeatureStatus};
