//! Configuration file management for blueprint.
//!
//! Provides a TOML-based config file at `~/.config/blueprint/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use blueprint_core::generate::GeneratorConfig;
use blueprint_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub openai: OpenAiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OpenAiSection {
    /// API key for the generative service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name; defaults to the client's built-in default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API root override for compatible gateways.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the blueprint config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/blueprint` or
/// `~/.config/blueprint`. We intentionally ignore the platform-specific
/// `dirs::config_dir()` (which returns `~/Library/Application Support` on
/// macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("blueprint");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("blueprint")
}

/// Return the path to the blueprint config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix (the file may hold an API key).
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct BlueprintConfig {
    pub db_config: DbConfig,
    file: Option<ConfigFile>,
}

impl BlueprintConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > default.
    ///
    /// DB URL: `cli_db_url` > `BLUEPRINT_DATABASE_URL` env >
    /// `config_file.database.url` > `DbConfig::DEFAULT_URL`.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var("BLUEPRINT_DATABASE_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        Ok(Self {
            db_config: DbConfig::new(db_url),
            file: file_config,
        })
    }

    /// Resolve the generation client config.
    ///
    /// - API key: `OPENAI_API_KEY` env > `config_file.openai.api_key` > error.
    /// - Model: `BLUEPRINT_MODEL` env > config file > client default.
    /// - Base URL: `BLUEPRINT_OPENAI_BASE_URL` env > config file > client default.
    ///
    /// Only commands that actually call the generative service need this,
    /// so the missing-key error is deferred until here.
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let openai = self.file.as_ref().map(|f| &f.openai);

        let api_key = if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            key
        } else if let Some(key) = openai.and_then(|o| o.api_key.clone()) {
            key
        } else {
            bail!(
                "OpenAI API key not found; set OPENAI_API_KEY or add it to {}",
                config_path().display()
            );
        };

        let mut config = GeneratorConfig::new(api_key);

        if let Ok(model) = std::env::var("BLUEPRINT_MODEL") {
            config.model = model;
        } else if let Some(model) = openai.and_then(|o| o.model.clone()) {
            config.model = model;
        }

        if let Ok(base_url) = std::env::var("BLUEPRINT_OPENAI_BASE_URL") {
            config.base_url = base_url;
        } else if let Some(base_url) = openai.and_then(|o| o.base_url.clone()) {
            config.base_url = base_url;
        }

        Ok(config)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
