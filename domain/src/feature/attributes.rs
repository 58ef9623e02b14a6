//! Feature attributes and availability

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Kind of discoverable feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// A language-model backend
    Inference,
    /// A provider of invokable tools
    Tools,
}

impl FeatureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FeatureKind::Inference => "inference",
            FeatureKind::Tools => "tools",
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static attributes of a feature (inference or tools provider)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAttributes {
    /// Stable unique name, used as the registry key and policy key
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Runs on the local machine
    pub local: bool,
    /// Public service (as opposed to a private/enterprise deployment)
    pub public: bool,
    /// Offers an interactive setup helper
    #[serde(default)]
    pub supports_setup: bool,
}

impl FeatureAttributes {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            local: false,
            public: false,
            supports_setup: false,
        }
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_setup_support(mut self) -> Self {
        self.supports_setup = true;
        self
    }
}

/// Outcome of a provider's availability probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub reason: String,
}

impl Availability {
    pub fn available(reason: impl Into<String>) -> Self {
        Self {
            available: true,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: reason.into(),
        }
    }
}

/// Interior-mutable holder for the last probe outcome.
///
/// Providers are shared behind `Arc`, so `initialize` records its result
/// here and `is_available` / `reason` read it back.
#[derive(Debug, Default)]
pub struct ProbeState {
    inner: RwLock<Availability>,
}

impl ProbeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, availability: Availability) {
        match self.inner.write() {
            Ok(mut guard) => *guard = availability,
            Err(poisoned) => *poisoned.into_inner() = availability,
        }
    }

    pub fn get(&self) -> Availability {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.get().available
    }

    pub fn reason(&self) -> String {
        self.get().reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_builder() {
        let attrs = FeatureAttributes::new("ollama", "Local models")
            .with_local(true)
            .with_setup_support();

        assert_eq!(attrs.name, "ollama");
        assert!(attrs.local);
        assert!(!attrs.public);
        assert!(attrs.supports_setup);
    }

    #[test]
    fn test_probe_state_defaults_to_unavailable() {
        let state = ProbeState::new();
        assert!(!state.is_available());
        assert_eq!(state.reason(), "");
    }

    #[test]
    fn test_probe_state_records_last_probe() {
        let state = ProbeState::new();
        state.set(Availability::available("found on PATH"));
        assert!(state.is_available());

        state.set(Availability::unavailable("not installed"));
        assert!(!state.is_available());
        assert_eq!(state.reason(), "not installed");
    }
}
