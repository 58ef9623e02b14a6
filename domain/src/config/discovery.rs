//! Configuration consumed by feature discovery

use crate::policy::FeatureSettings;
use std::collections::BTreeMap;

/// Configuration-level inputs to discovery.
///
/// Per-provider settings sit below the policy document in precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Preferred inference provider
    pub inference: Option<String>,
    /// Preferred model of the selected inference provider
    pub model: Option<String>,
    pub inferences: BTreeMap<String, FeatureSettings>,
    pub tools: BTreeMap<String, FeatureSettings>,
}

impl DiscoveryConfig {
    pub fn with_inference(mut self, name: impl Into<String>) -> Self {
        self.inference = Some(name.into());
        self
    }

    pub fn with_tools_settings(mut self, provider: impl Into<String>, settings: FeatureSettings) -> Self {
        self.tools.insert(provider.into(), settings);
        self
    }

    pub fn inference_settings(&self, name: &str) -> Option<&FeatureSettings> {
        self.inferences.get(name)
    }

    pub fn tools_settings(&self, name: &str) -> Option<&FeatureSettings> {
        self.tools.get(name)
    }
}
