//! Feature registry
//!
//! Registration tables for inference and tools providers, keyed by name.
//! Constructed once at startup and shared by `Arc`; discovery walks it.
//! Registering two providers under the same name is a programming error
//! and panics.

use crate::ports::feature_provider::{Feature, InferenceProvider, ToolsProvider};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
pub struct FeatureRegistry {
    inferences: RwLock<BTreeMap<String, Arc<dyn InferenceProvider>>>,
    tools: RwLock<BTreeMap<String, Arc<dyn ToolsProvider>>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// If an inference provider with the same name is already registered.
    pub fn register_inference(&self, provider: Arc<dyn InferenceProvider>) {
        let name = provider.name().to_string();
        let mut table = self.inferences.write().unwrap_or_else(PoisonError::into_inner);
        if table.contains_key(&name) {
            panic!("inference provider already registered: {name}");
        }
        table.insert(name, provider);
    }

    /// # Panics
    ///
    /// If a tools provider with the same name is already registered.
    pub fn register_tools(&self, provider: Arc<dyn ToolsProvider>) {
        let name = provider.name().to_string();
        let mut table = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if table.contains_key(&name) {
            panic!("tools provider already registered: {name}");
        }
        table.insert(name, provider);
    }

    /// Registered inference providers, sorted by name
    pub fn inferences(&self) -> Vec<Arc<dyn InferenceProvider>> {
        let table = self.inferences.read().unwrap_or_else(PoisonError::into_inner);
        table.values().cloned().collect()
    }

    /// Registered tools providers, sorted by name
    pub fn tools(&self) -> Vec<Arc<dyn ToolsProvider>> {
        let table = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        table.values().cloned().collect()
    }

    pub fn inference(&self, name: &str) -> Option<Arc<dyn InferenceProvider>> {
        let table = self.inferences.read().unwrap_or_else(PoisonError::into_inner);
        table.get(name).cloned()
    }

    pub fn tools_provider(&self, name: &str) -> Option<Arc<dyn ToolsProvider>> {
        let table = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        table.get(name).cloned()
    }

    /// Remove every registration (test reset)
    pub fn clear(&self) {
        self.inferences.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.tools.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl std::fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inferences: Vec<String> = self.inferences().iter().map(|p| p.name().to_string()).collect();
        let tools: Vec<String> = self.tools().iter().map(|p| p.name().to_string()).collect();
        f.debug_struct("FeatureRegistry")
            .field("inferences", &inferences)
            .field("tools", &tools)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockInferenceProvider, MockToolsProvider};

    #[test]
    fn test_register_and_list_sorted() {
        let registry = FeatureRegistry::new();
        registry.register_tools(Arc::new(MockToolsProvider::new("zeta")));
        registry.register_tools(Arc::new(MockToolsProvider::new("alpha")));
        registry.register_inference(Arc::new(MockInferenceProvider::new("ollama")));

        let names: Vec<_> = registry.tools().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(registry.inference("ollama").is_some());
        assert!(registry.tools_provider("missing").is_none());
    }

    #[test]
    #[should_panic(expected = "tools provider already registered: fs")]
    fn test_duplicate_tools_registration_panics() {
        let registry = FeatureRegistry::new();
        registry.register_tools(Arc::new(MockToolsProvider::new("fs")));
        registry.register_tools(Arc::new(MockToolsProvider::new("fs")));
    }

    #[test]
    #[should_panic(expected = "inference provider already registered: ollama")]
    fn test_duplicate_inference_registration_panics() {
        let registry = FeatureRegistry::new();
        registry.register_inference(Arc::new(MockInferenceProvider::new("ollama")));
        registry.register_inference(Arc::new(MockInferenceProvider::new("ollama")));
    }

    #[test]
    fn test_clear() {
        let registry = FeatureRegistry::new();
        registry.register_tools(Arc::new(MockToolsProvider::new("fs")));
        registry.register_inference(Arc::new(MockInferenceProvider::new("ollama")));

        registry.clear();

        assert!(registry.tools().is_empty());
        assert!(registry.inferences().is_empty());
        registry.register_tools(Arc::new(MockToolsProvider::new("fs")));
        assert_eq!(registry.tools().len(), 1);
    }
}
