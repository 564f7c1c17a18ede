//! Config Command
//!
//! Manage WeaveDoc configuration.
//!
//! Usage:
//!   weavedoc config show [-g] [-f toml|json|yaml]
//!   weavedoc config path
//!   weavedoc config init [-g] [--force]

use crate::config::{Config, ConfigLoader};
use crate::types::{Result, WeaveError};

/// Show configuration
pub fn show(global: bool, format: &str) -> Result<()> {
    if global {
        match ConfigLoader::global_config_path() {
            Some(global_path) if global_path.exists() => {
                let content = std::fs::read_to_string(&global_path)?;
                println!("# Global Config: {}\n", global_path.display());
                println!("{}", content);
            }
            Some(_) => {
                println!("No global config found.");
                println!("Run 'weavedoc config init --global' to create one.");
            }
            None => println!("Cannot determine global config directory."),
        }
        return Ok(());
    }

    // Merged effective config
    let config = ConfigLoader::load()?;
    println!("{}", render(&config, format)?);
    Ok(())
}

fn render(config: &Config, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(config)?),
        "yaml" => Ok(serde_yaml::to_string(config)?),
        "toml" | "text" => toml::to_string_pretty(config)
            .map_err(|e| WeaveError::Config(format!("Cannot render config: {}", e))),
        other => Err(WeaveError::Config(format!(
            "Unknown format '{}'. Valid values: toml, json, yaml",
            other
        ))),
    }
}

/// Show configuration paths
pub fn path() -> Result<()> {
    let project = ConfigLoader::project_config_path();
    match ConfigLoader::global_config_path() {
        Some(global) => println!("Global:  {} {}", global.display(), exists_marker(&global)),
        None => println!("Global:  (unavailable)"),
    }
    println!("Project: {} {}", project.display(), exists_marker(&project));
    println!("Env:     WEAVEDOC_<SECTION>__<KEY>");
    Ok(())
}

fn exists_marker(path: &std::path::Path) -> &'static str {
    if path.exists() { "(found)" } else { "(missing)" }
}

/// Initialize global configuration
pub fn init_global(force: bool) -> Result<()> {
    let config_path = ConfigLoader::init_global(force)?;
    println!("✓ Initialized global configuration");
    println!("  Config: {}", config_path.display());
    Ok(())
}

/// Initialize project configuration
pub fn init_project(force: bool) -> Result<()> {
    let config_path = ConfigLoader::init_project(force)?;
    println!("✓ Initialized project configuration");
    println!("  Config: {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        assert!(render(&config, "toml").unwrap().contains("[cascade]"));
        assert!(render(&config, "json").unwrap().contains("\"diff_base\""));
        assert!(render(&config, "yaml").unwrap().contains("min_method_lines"));
        assert!(render(&config, "xml").is_err());
    }

    #[test]
    fn test_api_key_never_rendered() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());
        assert!(!render(&config, "json").unwrap().contains("sk-secret"));
    }
}
