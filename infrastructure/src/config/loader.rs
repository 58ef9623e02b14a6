//! Configuration file loader with multi-source merging

use super::file_config::{ConfigError, FileConfig};
use aicli_domain::Policies;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "ai-cli";
const PROJECT_CONFIG_FILES: [&str; 2] = ["ai-cli.toml", ".ai-cli.toml"];
const ENV_PREFIX: &str = "AI_CLI_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `AI_CLI_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./ai-cli.toml` or `./.ai-cli.toml`
    /// 4. Global: `$CONFIG_DIR/ai-cli/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!(path = %global_path.display(), "Merging global config");
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            debug!(path = %path.display(), "Merging project config");
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            debug!(path = %path.display(), "Merging explicit config");
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$CONFIG_DIR/ai-cli/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// `$CONFIG_DIR/ai-cli/policies.toml`
    pub fn global_policies_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("policies.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Load the policy document.
    ///
    /// An explicit path must exist. Without one the global policies file
    /// is used when present; otherwise no policies apply.
    pub fn load_policies(path: Option<&Path>) -> Result<Option<Policies>, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::global_policies_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };
        Self::read_policies(&path).map(Some)
    }

    fn read_policies(path: &Path) -> Result<Policies, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PoliciesRead {
            path: shown.clone(),
            source,
        })?;
        debug!(path = %shown, "Loaded policies");
        toml::from_str(&raw).map_err(|source| ConfigError::PoliciesParse {
            path: shown,
            source,
        })
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>, policies_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Environment: {ENV_PREFIX}* variables");

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{mark:<5}] Explicit: {}", path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./ai-cli.toml or ./.ai-cli.toml");
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            println!("  [{mark}] Global:  {}", path.display());
        }

        println!("  [     ] Default: built-in defaults");

        match policies_path.map(Path::to_path_buf).or_else(Self::global_policies_path) {
            Some(path) if path.exists() => println!("Policies: {}", path.display()),
            Some(path) => println!("Policies: none ({} not found)", path.display()),
            None => println!("Policies: none"),
        }
    }
}
