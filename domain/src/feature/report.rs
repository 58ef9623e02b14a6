//! Discovery report: the serializable outcome of feature discovery

use super::attributes::FeatureAttributes;
use serde::{Deserialize, Serialize};

/// Status of one discovered provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStatus {
    pub name: String,
    pub description: String,
    pub local: bool,
    pub public: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
}

impl FeatureStatus {
    pub fn new(attributes: &FeatureAttributes, reason: impl Into<String>) -> Self {
        Self {
            name: attributes.name.clone(),
            description: attributes.description.clone(),
            local: attributes.local,
            public: attributes.public,
            reason: reason.into(),
            models: Vec::new(),
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }
}

/// Deterministically ordered discovery output, consumed by the CLI.
///
/// Every list is sorted by provider name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub inferences: Vec<FeatureStatus>,
    pub inferences_not_available: Vec<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inferences_disabled_by_policy: Vec<String>,
    /// Switched off in the user configuration rather than by policy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inferences_disabled: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference: Option<FeatureStatus>,
    pub tools: Vec<FeatureStatus>,
    pub tools_not_available: Vec<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_disabled_by_policy: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_disabled: Vec<String>,
}

impl DiscoveryReport {
    /// Indented JSON rendering
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_uses_camel_case_keys() {
        let attrs = FeatureAttributes::new("fs", "Local filesystem").with_local(true);
        let report = DiscoveryReport {
            tools: vec![FeatureStatus::new(&attrs, "always available")],
            ..Default::default()
        };

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["tools"][0]["name"], "fs");
        assert!(json["toolsNotAvailable"].as_array().unwrap().is_empty());
        assert!(json.get("inference").is_none());
        assert!(json["tools"][0].get("models").is_none());
    }
}
