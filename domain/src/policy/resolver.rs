//! Policy resolution
//!
//! Each axis is resolved independently with the same precedence:
//!
//! 1. provider-specific entry
//! 2. property-scoped entry for the provider's locality (`enabled` only)
//! 3. section-wide value
//! 4. configured value
//! 5. hard-coded default
//!
//! An unset value at any level falls through to the next one.

use super::document::{FeatureSettings, Policies, PolicyAxis, SectionPolicies};
use crate::feature::FeatureKind;

/// The feature a policy question is asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRef<'a> {
    pub kind: FeatureKind,
    pub name: &'a str,
    pub is_local: bool,
}

impl<'a> FeatureRef<'a> {
    pub fn inference(name: &'a str, is_local: bool) -> Self {
        Self {
            kind: FeatureKind::Inference,
            name,
            is_local,
        }
    }

    pub fn tools(name: &'a str, is_local: bool) -> Self {
        Self {
            kind: FeatureKind::Tools,
            name,
            is_local,
        }
    }
}

/// Configuration-level fallback for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigDefault {
    pub configured: Option<bool>,
    pub fallback: bool,
}

impl ConfigDefault {
    pub fn for_axis(axis: PolicyAxis) -> Self {
        Self {
            configured: None,
            fallback: axis.default_value(),
        }
    }

    pub fn with_configured(mut self, configured: Option<bool>) -> Self {
        self.configured = configured;
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    fn value(&self) -> bool {
        self.configured.unwrap_or(self.fallback)
    }
}

/// Resolved value of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub value: bool,
    /// The value came from the policy document rather than configuration.
    pub enforced_by_policy: bool,
}

/// Returns the first layer that sets a value.
pub fn first_set<I>(layers: I) -> Option<bool>
where
    I: IntoIterator<Item = Option<bool>>,
{
    layers.into_iter().flatten().next()
}

/// Resolve a single axis for a feature.
pub fn resolve(
    axis: PolicyAxis,
    feature: FeatureRef<'_>,
    policies: Option<&Policies>,
    default: ConfigDefault,
) -> Resolution {
    match policies.and_then(|p| policy_value(axis, feature, p.section(feature.kind))) {
        Some(value) => Resolution {
            value,
            enforced_by_policy: true,
        },
        None => Resolution {
            value: default.value(),
            enforced_by_policy: false,
        },
    }
}

fn policy_value(axis: PolicyAxis, feature: FeatureRef<'_>, section: &SectionPolicies) -> Option<bool> {
    let property = match axis {
        PolicyAxis::Enabled => section.property.for_locality(feature.is_local).get(axis),
        _ => None,
    };

    first_set([
        section.provider(feature.name).and_then(|entry| entry.get(axis)),
        property,
        section.global(axis),
    ])
}

/// All four axes resolved for one feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectivePolicy {
    pub enabled: Resolution,
    pub read_only: Resolution,
    pub non_destructive: Resolution,
    pub local: Resolution,
}

impl EffectivePolicy {
    /// Resolve every axis, using `configured` for the configuration level
    /// and each axis's hard-coded default below it.
    pub fn resolve(
        feature: FeatureRef<'_>,
        policies: Option<&Policies>,
        configured: Option<&FeatureSettings>,
    ) -> Self {
        let resolve_axis = |axis: PolicyAxis| {
            let default = ConfigDefault::for_axis(axis)
                .with_configured(configured.and_then(|c| c.get(axis)));
            resolve(axis, feature, policies, default)
        };

        Self {
            enabled: resolve_axis(PolicyAxis::Enabled),
            read_only: resolve_axis(PolicyAxis::ReadOnly),
            non_destructive: resolve_axis(PolicyAxis::NonDestructive),
            local: resolve_axis(PolicyAxis::Local),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.value
    }

    pub fn disabled_by_policy(&self) -> bool {
        !self.enabled.value && self.enabled.enforced_by_policy
    }
}
