//! Inference providers

pub mod ollama;

pub use ollama::{OllamaChatModel, OllamaProvider, OllamaSettings};
