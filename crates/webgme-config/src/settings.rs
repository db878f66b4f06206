//! User-level settings for the webgme CLI
//!
//! Stored as TOML in `~/.config/webgme-cli/config.toml` (or the platform config
//! directory on Windows). `WEBGME_CLI_CONFIG` overrides the location, which is
//! what tests and isolated runs use.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use which::which;

/// Environment variable that overrides the settings file location
pub const SETTINGS_ENV_VAR: &str = "WEBGME_CLI_CONFIG";

/// Keys accepted by `get`/`set`
pub const SETTINGS_KEYS: &[&str] = &["npm-path", "node-path", "install-timeout"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_path: Option<String>,
    /// Seconds to wait for a package install before giving up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_timeout: Option<u64>,
}

impl Settings {
    /// Directory for CLI-owned files (settings, log file)
    pub fn config_dir() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir().map_or_else(
                || PathBuf::from(".config").join("webgme-cli"),
                |home| home.join(".config").join("webgme-cli"),
            )
        }

        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map_or_else(
                || PathBuf::from("config").join("webgme-cli"),
                |dir| dir.join("webgme-cli"),
            )
        }
    }

    pub fn path() -> PathBuf {
        if let Ok(env_path) = std::env::var(SETTINGS_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from_path(&Self::path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Settings::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to_path(&Self::path())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "npm-path" => self.npm_path.clone(),
            "node-path" => self.node_path.clone(),
            "install-timeout" => self.install_timeout.map(|secs| secs.to_string()),
            _ => None,
        }
    }

    /// Set a key from its string form; unknown keys and bad values are rejected
    pub fn set(&mut self, key: &str, value: String) -> Result<(), String> {
        match key {
            "npm-path" => self.npm_path = Some(value),
            "node-path" => self.node_path = Some(value),
            "install-timeout" => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| format!("install-timeout must be a number of seconds, got '{}'", value))?;
                self.install_timeout = Some(secs);
            }
            _ => {
                return Err(format!(
                    "Unknown config key: {}. Supported keys: {}",
                    key,
                    SETTINGS_KEYS.join(", ")
                ))
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.npm_path.is_none() && self.node_path.is_none() && self.install_timeout.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        SETTINGS_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn install_timeout(&self) -> Option<Duration> {
        self.install_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Return the npm executable, discovering and persisting it when unset
    pub fn ensure_npm_path(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        ensure_tool(&mut self.npm_path, "npm")?;
        self.persist_discovered()?;
        self.npm_path
            .clone()
            .ok_or_else(|| "npm path not configured".into())
    }

    /// Return the node executable, discovering and persisting it when unset
    pub fn ensure_node_path(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        ensure_tool(&mut self.node_path, "node")?;
        self.persist_discovered()?;
        self.node_path
            .clone()
            .ok_or_else(|| "node path not configured".into())
    }

    fn persist_discovered(&self) -> Result<(), Box<dyn std::error::Error>> {
        // Only write when the file is ours to write; never create one under an override path
        if std::env::var_os(SETTINGS_ENV_VAR).is_some() {
            return Ok(());
        }
        self.save()
    }
}

fn ensure_tool(slot: &mut Option<String>, tool: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(ref path) = slot {
        if Path::new(path).exists() {
            return Ok(());
        }
        // Stored path no longer exists, rediscover it
        *slot = None;
    }

    match which(tool) {
        Ok(path) => {
            *slot = Some(path.to_string_lossy().trim().to_string());
            Ok(())
        }
        Err(_) => Err(format!(
            "{} is not installed or not on PATH. Install Node.js from https://nodejs.org/",
            tool
        )
        .into()),
    }
}
