//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/weavedoc/config.toml)
//! 3. Project config (.weavedoc/config.toml)
//! 4. Environment variables (WEAVEDOC_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, WeaveError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layered(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Load with explicit file locations; missing files are skipped
    pub fn load_layered(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // WEAVEDOC_CASCADE__DIFF_BASE -> cascade.diff_base
        figment = figment.merge(Env::prefixed("WEAVEDOC_").split("__").lowercase(true));

        Self::finish(figment)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Self::finish(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(path)),
        )
    }

    fn finish(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| WeaveError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/weavedoc/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("weavedoc"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".weavedoc")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a starter config into `dir`, returning the file path
    pub fn init_at(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_toml())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    pub fn init_global(force: bool) -> Result<PathBuf> {
        let dir = Self::global_dir().ok_or_else(|| {
            WeaveError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::init_at(&dir, force)
    }

    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::init_at(&Self::project_dir(), force)
    }

    fn default_config_toml() -> String {
        r#"# WeaveDoc Configuration
# Project settings in .weavedoc/config.toml override ~/.config/weavedoc/config.toml.
# Environment variables use WEAVEDOC_<SECTION>__<KEY>, e.g. WEAVEDOC_LLM__PROVIDER.

[llm]
provider = "anthropic"
timeout_secs = 300
max_retries = 2

[llm.generation]
model = "claude-opus-4-1-20250805"
max_tokens = 5000
input_cost_per_token = 0.000015
output_cost_per_token = 0.000075

[llm.audit]
model = "claude-3-5-haiku-20241022"
max_tokens = 1024
input_cost_per_token = 0.000001
output_cost_per_token = 0.000005

[eligibility]
min_file_lines = 30
min_method_lines = 10

[cascade]
diff_base = "HEAD~1"
diff_head = "HEAD"
max_trivial_changes = 0
force_audit = false

[generation]
implementation_notes = true

[vcs]
base_ref = "main"
remote = "origin"
"#
        .to_string()
    }
}
