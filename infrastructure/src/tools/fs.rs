//! Local filesystem toolset: `file_list`

use aicli_application::{Feature, ProviderError, ProviderOptions, ToolsProvider};
use aicli_domain::{
    Availability, FeatureAttributes, ProbeState, Tool, ToolArguments, ToolDefinition, ToolError,
    ToolParameter,
};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const FS_PROVIDER: &str = "fs";
pub const FILE_LIST: &str = "file_list";

/// Timestamp layout of `mod_time`
const MOD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct FsToolsProvider {
    attributes: FeatureAttributes,
    probe: ProbeState,
}

impl Default for FsToolsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FsToolsProvider {
    pub fn new() -> Self {
        Self {
            attributes: FeatureAttributes::new(
                FS_PROVIDER,
                "Provides access to the local filesystem, allowing listing of files and directories.",
            )
            .with_local(true),
            probe: ProbeState::new(),
        }
    }
}

#[async_trait]
impl Feature for FsToolsProvider {
    fn attributes(&self) -> &FeatureAttributes {
        &self.attributes
    }

    // Every operation is read-only, so the safety options change nothing
    async fn initialize(&self, _options: &ProviderOptions) {
        self.probe
            .set(Availability::available("filesystem is accessible"));
    }

    fn is_available(&self) -> bool {
        self.probe.is_available()
    }

    fn reason(&self) -> String {
        self.probe.reason()
    }
}

#[async_trait]
impl ToolsProvider for FsToolsProvider {
    async fn get_tools(&self) -> Result<Vec<Tool>, ProviderError> {
        Ok(vec![Tool::local(file_list_definition(), FS_PROVIDER, file_list)])
    }
}

pub fn file_list_definition() -> ToolDefinition {
    ToolDefinition::new(
        FILE_LIST,
        "List files in the provided directory or the current working directory if none is provided. \
         Returns a JSON representation of the files, including their names and metadata.",
    )
    .with_parameter(ToolParameter::new(
        "directory",
        "The directory to list files from. If not provided, the current working directory will be used.",
        false,
    ))
}

#[derive(Debug, Serialize)]
struct FileEntry {
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mod_time: Option<String>,
}

fn file_list(args: &ToolArguments) -> Result<String, ToolError> {
    let directory = args
        .get_str("directory")
        .filter(|d| !d.is_empty())
        .unwrap_or(".");
    let entries = list_directory(Path::new(directory))
        .map_err(|e| ToolError::execution_failed(format!("failed to list '{directory}': {e}")))?;

    serde_json::to_string(&entries)
        .map_err(|e| ToolError::execution_failed(format!("failed to encode listing: {e}")))
}

fn list_directory(directory: &Path) -> std::io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let kind = match entry.file_type() {
            Ok(t) if t.is_dir() => "directory",
            Ok(t) if t.is_symlink() => "symlink",
            Ok(t) if t.is_file() => "file",
            _ => "other",
        };
        let metadata = entry.metadata().ok();
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
            size: metadata.as_ref().map(|m| m.len()),
            mod_time: metadata
                .and_then(|m| m.modified().ok())
                .map(|t| DateTime::<Local>::from(t).format(MOD_TIME_FORMAT).to_string()),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn file_list_tool() -> Tool {
        FsToolsProvider::new().get_tools().await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_initialize_marks_available() {
        let provider = FsToolsProvider::new();
        assert!(!provider.is_available());

        provider.initialize(&ProviderOptions::default()).await;

        assert!(provider.is_available());
        assert_eq!(provider.reason(), "filesystem is accessible");
        assert!(provider.attributes().local);
    }

    #[tokio::test]
    async fn test_file_list_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("a-dir")).unwrap();

        let tool = file_list_tool().await;
        let args = serde_json::json!({ "directory": dir.path() }).to_string();
        let output = tool.invoke(&args).await.unwrap();

        let entries: Vec<Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "a-dir");
        assert_eq!(entries[0]["type"], "directory");
        assert_eq!(entries[1]["name"], "b.txt");
        assert_eq!(entries[1]["type"], "file");
        assert_eq!(entries[1]["size"], 5);
        assert!(entries[1]["mod_time"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_file_list_defaults_to_current_directory() {
        let tool = file_list_tool().await;
        let output = tool.invoke("{}").await.unwrap();
        let entries: Vec<Value> = serde_json::from_str(&output).unwrap();
        assert!(entries.iter().any(|e| e["name"] == "Cargo.toml"));
    }

    #[tokio::test]
    async fn test_file_list_missing_directory_fails() {
        let tool = file_list_tool().await;
        let err = tool
            .invoke(r#"{"directory": "/definitely/not/here"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }
}
