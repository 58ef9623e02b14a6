//! Layered enablement policies and their resolution

pub mod document;
pub mod resolver;

pub use document::{FeatureSettings, Policies, PolicyAxis, PropertyPolicies, SectionPolicies};
pub use resolver::{ConfigDefault, EffectivePolicy, FeatureRef, Resolution, first_set, resolve};
