//! Discover features use case
//!
//! Walks the [`FeatureRegistry`], resolves every provider's effective
//! policy and probes only those that policy allows. Providers that are
//! disabled never have [`Feature::initialize`] called: probes may hit the
//! network or look for executables.

use crate::ports::feature_provider::{Feature, InferenceProvider, ProviderOptions, ToolsProvider};
use crate::registry::FeatureRegistry;
use aicli_domain::{
    DiscoveryConfig, DiscoveryReport, EffectivePolicy, FeatureKind, FeatureRef, FeatureSettings,
    FeatureStatus, Policies,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of discovery, every list sorted by provider name
#[derive(Default)]
pub struct Features {
    pub inferences: Vec<Arc<dyn InferenceProvider>>,
    pub inferences_not_available: Vec<Arc<dyn InferenceProvider>>,
    pub inferences_disabled_by_policy: Vec<Arc<dyn InferenceProvider>>,
    /// Disabled by configuration only; never probed either
    pub inferences_disabled: Vec<Arc<dyn InferenceProvider>>,
    /// Selected inference: the configured one if available, else the first available
    pub inference: Option<Arc<dyn InferenceProvider>>,
    pub tools: Vec<Arc<dyn ToolsProvider>>,
    pub tools_not_available: Vec<Arc<dyn ToolsProvider>>,
    pub tools_disabled_by_policy: Vec<Arc<dyn ToolsProvider>>,
    pub tools_disabled: Vec<Arc<dyn ToolsProvider>>,
}

impl Features {
    /// Serializable snapshot of the discovery outcome
    pub fn report(&self) -> DiscoveryReport {
        let inference_status = |p: &Arc<dyn InferenceProvider>| {
            FeatureStatus::new(p.attributes(), p.reason()).with_models(p.models())
        };
        let tools_status = |p: &Arc<dyn ToolsProvider>| FeatureStatus::new(p.attributes(), p.reason());

        DiscoveryReport {
            inferences: self.inferences.iter().map(inference_status).collect(),
            inferences_not_available: self
                .inferences_not_available
                .iter()
                .map(inference_status)
                .collect(),
            inferences_disabled_by_policy: names(&self.inferences_disabled_by_policy),
            inferences_disabled: names(&self.inferences_disabled),
            inference: self.inference.as_ref().map(inference_status),
            tools: self.tools.iter().map(tools_status).collect(),
            tools_not_available: self.tools_not_available.iter().map(tools_status).collect(),
            tools_disabled_by_policy: names(&self.tools_disabled_by_policy),
            tools_disabled: names(&self.tools_disabled),
        }
    }
}

fn names<P: Feature + ?Sized>(providers: &[Arc<P>]) -> Vec<String> {
    providers.iter().map(|p| p.name().to_string()).collect()
}

struct Classified<P: ?Sized> {
    available: Vec<Arc<P>>,
    not_available: Vec<Arc<P>>,
    disabled_by_policy: Vec<Arc<P>>,
    disabled_by_config: Vec<Arc<P>>,
}

/// Use case for discovering which features are usable
pub struct DiscoverFeaturesUseCase {
    registry: Arc<FeatureRegistry>,
}

impl DiscoverFeaturesUseCase {
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, config: &DiscoveryConfig, policies: Option<&Policies>) -> Features {
        let inferences = classify(
            self.registry.inferences(),
            FeatureKind::Inference,
            &config.inferences,
            policies,
        )
        .await;
        let tools = classify(
            self.registry.tools(),
            FeatureKind::Tools,
            &config.tools,
            policies,
        )
        .await;

        let inference = select_inference(&inferences.available, config.inference.as_deref());
        if let Some(selected) = &inference {
            info!(inference = %selected.name(), "Selected inference provider");
        }

        Features {
            inferences: inferences.available,
            inferences_not_available: inferences.not_available,
            inferences_disabled_by_policy: inferences.disabled_by_policy,
            inferences_disabled: inferences.disabled_by_config,
            inference,
            tools: tools.available,
            tools_not_available: tools.not_available,
            tools_disabled_by_policy: tools.disabled_by_policy,
            tools_disabled: tools.disabled_by_config,
        }
    }
}

async fn classify<P>(
    providers: Vec<Arc<P>>,
    kind: FeatureKind,
    settings: &BTreeMap<String, FeatureSettings>,
    policies: Option<&Policies>,
) -> Classified<P>
where
    P: Feature + ?Sized,
{
    let mut disabled_by_policy = Vec::new();
    let mut disabled_by_config = Vec::new();
    let mut probing = Vec::new();

    for provider in providers {
        let attributes = provider.attributes();
        let feature = FeatureRef {
            kind,
            name: &attributes.name,
            is_local: attributes.local,
        };
        let policy = EffectivePolicy::resolve(feature, policies, settings.get(&attributes.name));

        if !policy.is_enabled() {
            debug!(
                provider = %attributes.name,
                kind = %kind,
                enforced_by_policy = policy.enabled.enforced_by_policy,
                "Provider disabled, skipping probe"
            );
            if policy.disabled_by_policy() {
                disabled_by_policy.push(provider);
            } else {
                disabled_by_config.push(provider);
            }
            continue;
        }
        probing.push((provider, ProviderOptions::from_policy(&policy)));
    }

    futures::future::join_all(
        probing
            .iter()
            .map(|(provider, options)| provider.initialize(options)),
    )
    .await;

    let mut available = Vec::new();
    let mut not_available = Vec::new();
    for (provider, _) in probing {
        debug!(
            provider = %provider.name(),
            kind = %kind,
            available = provider.is_available(),
            reason = %provider.reason(),
            "Probed provider"
        );
        if provider.is_available() {
            available.push(provider);
        } else {
            not_available.push(provider);
        }
    }

    for list in [
        &mut available,
        &mut not_available,
        &mut disabled_by_policy,
        &mut disabled_by_config,
    ] {
        list.sort_by(|a, b| a.name().cmp(b.name()));
    }

    Classified {
        available,
        not_available,
        disabled_by_policy,
        disabled_by_config,
    }
}

fn select_inference(
    available: &[Arc<dyn InferenceProvider>],
    preferred: Option<&str>,
) -> Option<Arc<dyn InferenceProvider>> {
    if let Some(name) = preferred {
        if let Some(provider) = available.iter().find(|p| p.name() == name) {
            return Some(provider.clone());
        }
        warn!(inference = name, "Configured inference provider is not available");
    }
    available.first().cloned()
}
