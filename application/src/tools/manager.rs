//! Tool manager
//!
//! Owns the catalogue of available tools and the mutable set of enabled
//! ones. Every toolset starts disabled. The model opts into toolsets
//! mid-conversation through the [`TOOLSET_ENABLE`] meta tool, so the
//! enabled set changes after the agent has been built.

use crate::ports::feature_provider::{Feature, ToolsProvider};
use aicli_domain::{Tool, ToolArguments, ToolDefinition, ToolError, ToolHandler, ToolParameter};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Name of the meta tool that enables toolsets
pub const TOOLSET_ENABLE: &str = "toolset_enable";

const TOOLSETS_PARAM: &str = "toolsets";

struct Catalogue {
    available: Vec<Tool>,
    /// Toolset name -> description
    toolsets: BTreeMap<String, String>,
    enabled: RwLock<BTreeMap<String, Tool>>,
}

impl Catalogue {
    fn enable(&self, toolsets: &str) -> String {
        let results: Vec<String> = toolsets
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| self.enable_toolset(name))
            .collect();

        if results.is_empty() {
            "No toolsets given.".to_string()
        } else {
            results.join("\n")
        }
    }

    fn enable_toolset(&self, toolset: &str) -> String {
        if !self.toolsets.contains_key(toolset) {
            debug!(toolset, "Unknown toolset requested");
            return format!("Toolset '{toolset}' not found.");
        }

        let mut enabled = self.enabled.write().unwrap_or_else(PoisonError::into_inner);
        let mut added = Vec::new();
        let mut already = 0;
        for tool in self.available.iter().filter(|t| t.provider() == toolset) {
            if enabled.contains_key(tool.name()) {
                already += 1;
                continue;
            }
            enabled.insert(tool.name().to_string(), tool.clone());
            added.push(tool.name());
        }

        match (added.is_empty(), already) {
            (true, 0) => format!("Toolset '{toolset}' has no tools."),
            (true, _) => format!("Toolset '{toolset}' was already enabled."),
            (false, _) => {
                info!(toolset, tools = added.len(), "Toolset enabled");
                format!("Toolset '{toolset}' enabled: {}", added.join(", "))
            }
        }
    }

    fn enabled(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Tool>> {
        self.enabled.read().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ToolsetEnableHandler(Arc<Catalogue>);

#[async_trait]
impl ToolHandler for ToolsetEnableHandler {
    async fn invoke(&self, definition: &ToolDefinition, arguments: &str) -> Result<String, ToolError> {
        let arguments = ToolArguments::decode(definition, arguments)?;
        Ok(self.0.enable(arguments.require_str(TOOLSETS_PARAM)?))
    }
}

fn meta_definition(toolsets: &BTreeMap<String, String>) -> ToolDefinition {
    let mut description = String::from(
        "Enable one or more toolsets so that their tools can be called. \
         Call this before using a tool from a toolset.\n<toolsets>\n",
    );
    for (name, toolset_description) in toolsets {
        description.push_str(&format!(
            "  <toolset name=\"{name}\">{toolset_description}</toolset>\n"
        ));
    }
    description.push_str("</toolsets>");

    let names: Vec<&str> = toolsets.keys().map(String::as_str).collect();
    ToolDefinition::new(TOOLSET_ENABLE, description).with_parameter(
        ToolParameter::new(
            TOOLSETS_PARAM,
            format!(
                "Comma-separated list of toolset names to enable. Allowed values: {}",
                names.join(", ")
            ),
            true,
        )
        .with_allowed(names),
    )
}

/// Catalogue of available tools with a runtime-mutable enabled subset
pub struct ToolManager {
    catalogue: Arc<Catalogue>,
    meta: Tool,
}

impl ToolManager {
    /// Build the catalogue from the enabled tools providers and their
    /// already adapted tools (local and MCP-backed).
    ///
    /// A tool whose name is already taken is skipped with a warning.
    pub fn new(providers: &[Arc<dyn ToolsProvider>], tools: Vec<Tool>) -> Self {
        let mut toolsets: BTreeMap<String, String> = providers
            .iter()
            .map(|p| (p.name().to_string(), p.attributes().description.clone()))
            .collect();

        let mut seen = HashSet::new();
        let mut available = Vec::with_capacity(tools.len());
        for tool in tools {
            if tool.name() == TOOLSET_ENABLE || !seen.insert(tool.name().to_string()) {
                warn!(tool = tool.name(), provider = tool.provider(), "Duplicate tool name, skipping");
                continue;
            }
            toolsets.entry(tool.provider().to_string()).or_default();
            available.push(tool);
        }
        available.sort_by(|a, b| a.name().cmp(b.name()));

        let meta_definition = meta_definition(&toolsets);
        let catalogue = Arc::new(Catalogue {
            available,
            toolsets,
            enabled: RwLock::new(BTreeMap::new()),
        });
        let meta = Tool::new(
            meta_definition,
            "",
            Arc::new(ToolsetEnableHandler(catalogue.clone())),
        );

        Self { catalogue, meta }
    }

    /// Currently enabled tools sorted by name, followed by the meta tool
    pub fn enabled_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.catalogue.enabled().values().cloned().collect();
        tools.push(self.meta.clone());
        tools
    }

    pub fn enabled_definitions(&self) -> Vec<ToolDefinition> {
        self.enabled_tools()
            .iter()
            .map(|t| t.definition().clone())
            .collect()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        name == TOOLSET_ENABLE || self.catalogue.enabled().contains_key(name)
    }

    /// Invoke an enabled tool by name.
    ///
    /// An unknown or not yet enabled name yields a textual "not found"
    /// result rather than an error, so the model can recover.
    pub async fn invoke_tool(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        if name == TOOLSET_ENABLE {
            return self.meta.invoke(arguments).await;
        }

        let tool = self.catalogue.enabled().get(name).cloned();
        match tool {
            Some(tool) => tool.invoke(arguments).await,
            None => {
                debug!(tool = name, "Tool not enabled");
                Ok(self.not_found(name))
            }
        }
    }

    fn not_found(&self, name: &str) -> String {
        match self.catalogue.available.iter().find(|t| t.name() == name) {
            Some(tool) => format!(
                "Tool '{name}' not found among enabled tools. \
                 Enable the '{}' toolset with {TOOLSET_ENABLE} first.",
                tool.provider()
            ),
            None => format!("Tool '{name}' not found."),
        }
    }

    pub fn meta_tool(&self) -> &Tool {
        &self.meta
    }

    /// Known toolset names, sorted
    pub fn toolsets(&self) -> Vec<String> {
        self.catalogue.toolsets.keys().cloned().collect()
    }

    /// Number of available tools, excluding the meta tool
    pub fn tool_count(&self) -> usize {
        self.catalogue.available.len()
    }

    /// Number of enabled tools, excluding the meta tool
    pub fn tool_enabled_count(&self) -> usize {
        self.catalogue.enabled().len()
    }
}

impl std::fmt::Debug for ToolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolManager")
            .field("toolsets", &self.toolsets())
            .field("tool_count", &self.tool_count())
            .field("tool_enabled_count", &self.tool_enabled_count())
            .finish()
    }
}
