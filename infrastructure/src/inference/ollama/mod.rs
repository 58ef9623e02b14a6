//! Ollama inference provider
//!
//! Probes `GET /api/tags` to decide availability and list models, then
//! serves chat through [`OllamaChatModel`]. The server address comes from
//! configuration, then `OLLAMA_HOST`, then [`DEFAULT_BASE_URL`].

pub mod model;
pub mod types;

pub use model::OllamaChatModel;

use aicli_application::{ChatModel, Feature, InferenceProvider, ModelError, ProviderOptions};
use aicli_domain::{Availability, FeatureAttributes, ProbeState};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};
use types::TagsResponse;

pub const OLLAMA_PROVIDER: &str = "ollama";
pub const OLLAMA_HOST_ENV_VAR: &str = "OLLAMA_HOST";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Picked in order when no model is configured
pub const PREFERRED_MODELS: [&str; 3] = ["llama3.2:3b", "granite3.3:latest", "mistral:7b"];

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the base URL came from, for the availability reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlSource {
    Default,
    Environment,
    Configuration,
}

impl UrlSource {
    fn suffix(self) -> &'static str {
        match self {
            UrlSource::Default => "",
            UrlSource::Environment => " defined by the OLLAMA_HOST environment variable",
            UrlSource::Configuration => " defined in the configuration",
        }
    }
}

/// Settings from the `[inference.ollama]` config section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OllamaSettings {
    pub base_url: Option<String>,
    pub model: Option<String>,
}

fn normalize_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

fn resolve_base_url(configured: Option<&str>, host_env: Option<&str>) -> (String, UrlSource) {
    if let Some(url) = configured.filter(|u| !u.trim().is_empty()) {
        return (normalize_url(url), UrlSource::Configuration);
    }
    if let Some(host) = host_env.filter(|h| !h.trim().is_empty()) {
        return (normalize_url(host), UrlSource::Environment);
    }
    (DEFAULT_BASE_URL.to_string(), UrlSource::Default)
}

/// Explicit choice, else a preferred model, else the first one listed
pub fn select_model(requested: Option<&str>, models: &[String]) -> Option<String> {
    if let Some(model) = requested {
        return Some(model.to_string());
    }
    PREFERRED_MODELS
        .iter()
        .find(|preferred| models.iter().any(|m| m == *preferred))
        .map(|m| m.to_string())
        .or_else(|| models.first().cloned())
}

pub struct OllamaProvider {
    attributes: FeatureAttributes,
    client: reqwest::Client,
    base_url: String,
    url_source: UrlSource,
    model: Option<String>,
    probe: ProbeState,
    models: RwLock<Vec<String>>,
}

impl OllamaProvider {
    pub fn new(settings: OllamaSettings) -> Self {
        let host_env = std::env::var(OLLAMA_HOST_ENV_VAR).ok();
        Self::with_host_env(settings, host_env.as_deref())
    }

    pub fn with_host_env(settings: OllamaSettings, host_env: Option<&str>) -> Self {
        let (base_url, url_source) = resolve_base_url(settings.base_url.as_deref(), host_env);
        Self {
            attributes: FeatureAttributes::new(OLLAMA_PROVIDER, "Ollama local inference provider")
                .with_local(true)
                .with_public(false),
            client: reqwest::Client::new(),
            base_url,
            url_source,
            model: settings.model,
            probe: ProbeState::new(),
            models: RwLock::new(Vec::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn probe_tags(&self) -> Availability {
        let url = format!("{}/api/tags", self.base_url);
        let suffix = self.url_source.suffix();
        let response = match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "Ollama probe failed");
                return Availability::unavailable(format!(
                    "ollama is not accessible at {}{suffix}",
                    self.base_url
                ));
            }
        };

        let not_ollama = || {
            Availability::unavailable(format!(
                "the server at {}{suffix} is accessible but is not Ollama",
                self.base_url
            ))
        };
        if !response.status().is_success() {
            return not_ollama();
        }
        let tags: TagsResponse = match response.json().await {
            Ok(tags) => tags,
            Err(e) => {
                debug!(error = %e, "Unexpected /api/tags payload");
                return not_ollama();
            }
        };

        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        info!(url = %self.base_url, models = names.len(), "Ollama is accessible");
        *self.models.write().unwrap_or_else(PoisonError::into_inner) = names;
        Availability::available(format!("ollama is accessible at {}{suffix}", self.base_url))
    }
}

#[async_trait]
impl Feature for OllamaProvider {
    fn attributes(&self) -> &FeatureAttributes {
        &self.attributes
    }

    async fn initialize(&self, _options: &ProviderOptions) {
        self.models.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.probe.set(self.probe_tags().await);
    }

    fn is_available(&self) -> bool {
        self.probe.is_available()
    }

    fn reason(&self) -> String {
        self.probe.reason()
    }
}

#[async_trait]
impl InferenceProvider for OllamaProvider {
    fn models(&self) -> Vec<String> {
        self.models.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn get_inference(&self, model: Option<&str>) -> Result<Arc<dyn ChatModel>, ModelError> {
        let requested = model.or(self.model.as_deref());
        let selected = select_model(requested, &self.models())
            .ok_or_else(|| ModelError::ModelNotAvailable("no models available from ollama".into()))?;
        debug!(model = %selected, "Selected Ollama model");
        Ok(Arc::new(OllamaChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            selected,
        )))
    }
}
