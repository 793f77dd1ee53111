use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_BACKEND_URL, HEALTH_CHECK_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UIConfig,
}

/// Where the document backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, without the /api suffix
    pub base_url: String,
    /// Upper bound for a single upload or chat request, in seconds
    pub request_timeout_secs: u64,
    /// Upper bound for the health probe, in seconds
    pub health_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            health_timeout_secs: HEALTH_CHECK_TIMEOUT_SECS,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UIConfig {
    /// Show the attached-documents bar
    pub show_documents: bool,
    /// Render assistant answers as markdown
    pub render_markdown: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            show_documents: true,
            render_markdown: true,
        }
    }
}

fn base_figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn extract(figment: Figment) -> Result<Config> {
    // PDFCHAT_BACKEND__BASE_URL -> backend.base_url
    figment
        .merge(Env::prefixed("PDFCHAT_").split("__"))
        .extract()
        .context("Failed to load configuration")
}

/// Files a load reads, lowest precedence first. An explicit file replaces
/// the global and project-local lookup.
pub fn config_sources(explicit: Option<&Path>) -> Result<Vec<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(if path.exists() {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let global_config = get_config_dir()?.join("config.toml");
    let local_config = PathBuf::from(".pdfchat/config.toml");
    Ok([global_config, local_config]
        .into_iter()
        .filter(|p| p.exists())
        .collect())
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let figment = config_sources(None)?
        .iter()
        .fold(base_figment(), |figment, path| figment.merge(Toml::file(path)));

    extract(figment)
}

/// Load configuration from an explicit file, still honouring environment overrides
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }
    extract(base_figment().merge(Toml::file(path)))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pdfchat") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("pdfchat");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Directory for the interactive-mode log file
pub fn get_data_dir() -> Result<PathBuf> {
    let dir = match ProjectDirs::from("", "", "pdfchat") {
        Some(proj_dirs) => proj_dirs.data_dir().to_path_buf(),
        None => get_config_dir()?,
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<()> {
    let config_dir = get_config_dir()?;
    let config_file = config_dir.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    }

    let local_example = PathBuf::from(".pdfchat/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# pdfchat project configuration
# This file overrides global settings for this directory

[backend]
base_url = "http://localhost:8000"
request_timeout_secs = 600

[ui]
show_documents = true
render_markdown = true
"#;
        std::fs::write(&local_example, example_config)?;
        println!("Created example configuration at: {}", local_example.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.request_timeout_secs, 600);
        assert!(config.ui.render_markdown);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nbase_url = \"http://docs.internal:9000\"\nrequest_timeout_secs = 30\nhealth_timeout_secs = 1\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.backend.base_url, "http://docs.internal:9000");
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.ui, UIConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut config = Config::default();
        config.ui.show_documents = false;

        save_config(&config, Some(path.clone())).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_explicit_file_is_the_only_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("team.toml");
        std::fs::write(&path, "[ui]\nshow_documents = false\nrender_markdown = true\n").unwrap();

        assert_eq!(config_sources(Some(&path)).unwrap(), vec![path.clone()]);
        assert!(config_sources(Some(&temp_dir.path().join("nope.toml")))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_config_from(&temp_dir.path().join("nope.toml")).is_err());
    }
}
