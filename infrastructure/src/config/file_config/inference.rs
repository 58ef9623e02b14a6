use serde::{Deserialize, Serialize};

/// `[inference]` section
///
/// ```toml
/// [inference]
/// name = "ollama"
/// model = "llama3.2:3b"
///
/// [inference.ollama]
/// base_url = "http://gpu-box:11434"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInferenceConfig {
    /// Preferred inference provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Preferred model of that provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub ollama: FileOllamaConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}
