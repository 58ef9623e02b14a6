//! Policy document model
//!
//! ```toml
//! [inferences]
//! enabled = true
//!
//! [inferences.property.remote]
//! enabled = false
//!
//! [inferences.provider.ollama]
//! enabled = true
//!
//! [tools]
//! read-only = true
//!
//! [tools.provider.fs]
//! enabled = false
//! ```

use crate::feature::FeatureKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One independently resolved policy setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyAxis {
    Enabled,
    ReadOnly,
    NonDestructive,
    Local,
}

impl PolicyAxis {
    pub const ALL: [PolicyAxis; 4] = [
        PolicyAxis::Enabled,
        PolicyAxis::ReadOnly,
        PolicyAxis::NonDestructive,
        PolicyAxis::Local,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PolicyAxis::Enabled => "enabled",
            PolicyAxis::ReadOnly => "read-only",
            PolicyAxis::NonDestructive => "non-destructive",
            PolicyAxis::Local => "local",
        }
    }

    /// Hard-coded default when neither policy nor configuration set a value.
    pub fn default_value(&self) -> bool {
        matches!(self, PolicyAxis::Enabled)
    }
}

impl std::fmt::Display for PolicyAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional per-axis values.
///
/// Used both for policy entries and for per-provider configuration;
/// `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FeatureSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_destructive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
}

impl FeatureSettings {
    pub fn get(&self, axis: PolicyAxis) -> Option<bool> {
        match axis {
            PolicyAxis::Enabled => self.enabled,
            PolicyAxis::ReadOnly => self.read_only,
            PolicyAxis::NonDestructive => self.non_destructive,
            PolicyAxis::Local => self.local,
        }
    }

    pub fn with(mut self, axis: PolicyAxis, value: bool) -> Self {
        let slot = match axis {
            PolicyAxis::Enabled => &mut self.enabled,
            PolicyAxis::ReadOnly => &mut self.read_only,
            PolicyAxis::NonDestructive => &mut self.non_destructive,
            PolicyAxis::Local => &mut self.local,
        };
        *slot = Some(value);
        self
    }
}

/// Property-scoped entries, selected by the provider's locality
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyPolicies {
    pub remote: FeatureSettings,
    pub local: FeatureSettings,
}

impl PropertyPolicies {
    pub fn for_locality(&self, is_local: bool) -> &FeatureSettings {
        if is_local { &self.local } else { &self.remote }
    }
}

/// Policies for one feature kind: global values, property scopes and
/// per-provider entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SectionPolicies {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_destructive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    pub property: PropertyPolicies,
    pub provider: BTreeMap<String, FeatureSettings>,
}

impl SectionPolicies {
    pub fn global(&self, axis: PolicyAxis) -> Option<bool> {
        match axis {
            PolicyAxis::Enabled => self.enabled,
            PolicyAxis::ReadOnly => self.read_only,
            PolicyAxis::NonDestructive => self.non_destructive,
            PolicyAxis::Local => self.local,
        }
    }

    pub fn provider(&self, name: &str) -> Option<&FeatureSettings> {
        self.provider.get(name)
    }
}

/// The complete policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policies {
    pub inferences: SectionPolicies,
    pub tools: SectionPolicies,
}

impl Policies {
    pub fn section(&self, kind: FeatureKind) -> &SectionPolicies {
        match kind {
            FeatureKind::Inference => &self.inferences,
            FeatureKind::Tools => &self.tools,
        }
    }
}
