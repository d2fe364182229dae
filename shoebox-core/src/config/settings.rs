//! Settings configuration loaded from TOML files.
//!
//! This module handles non-sensitive configuration stored in TOML format
//! in the XDG config directory (~/.config/shoebox/config.toml).

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# shoebox configuration file
# Located at: ~/.config/shoebox/config.toml
#
# This file contains non-sensitive configuration.
# Secrets are loaded from environment variables:
#   - DISCORD_BOT_TOKEN
#   - ASSET_API_KEY

[asset]
# Base URL of the asset service, e.g. "https://photos.example.com"
endpoint = ""

[discord]
# Discord user IDs allowed to trigger the backup command
authorized_user_ids = []

[transfer]
# Directory where attachments are staged before upload
staging_dir = "/tmp/shoebox"
"#;

/// Settings loaded from TOML configuration file.
///
/// These are non-sensitive configuration values that can be safely
/// stored in files and version controlled (excluding secrets).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Asset service configuration
    #[serde(default)]
    pub asset: AssetSettings,

    /// Discord bot configuration
    #[serde(default)]
    pub discord: DiscordSettings,

    /// Attachment transfer configuration
    #[serde(default)]
    pub transfer: TransferSettings,
}

/// Asset service settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssetSettings {
    /// Base URL of the asset service (e.g. "https://photos.example.com")
    #[serde(default)]
    pub endpoint: String,
}

/// Discord bot settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscordSettings {
    /// User IDs allowed to trigger the backup command
    #[serde(default)]
    pub authorized_user_ids: Vec<String>,
}

/// Attachment transfer settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferSettings {
    /// Directory where attachments are staged before upload
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
        }
    }
}

fn default_staging_dir() -> String {
    "/tmp/shoebox".to_string()
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    /// The file is located at `~/.config/shoebox/config.toml`.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;

        // Create default config if it doesn't exist
        if !config_path.exists() {
            tracing::info!("Creating default configuration at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        // Read and parse the TOML file
        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Serialize settings to TOML content.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the configuration file path.
    ///
    /// Uses XDG config directory: `~/.config/shoebox/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("SHOEBOX_CONFIG_DIR") {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("shoebox");

        Ok(config_dir.join("config.toml"))
    }

    /// Create the default configuration file.
    fn create_default_config(path: &PathBuf) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write default TOML config
        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let settings = Settings::from_toml(DEFAULT_CONFIG_TOML).unwrap();

        assert!(settings.asset.endpoint.is_empty());
        assert!(settings.discord.authorized_user_ids.is_empty());
        assert_eq!(settings.transfer.staging_dir, "/tmp/shoebox");
    }

    #[test]
    fn test_from_toml_full() {
        let toml = r#"
[asset]
endpoint = "https://photos.example.com"

[discord]
authorized_user_ids = ["123456789012345678", "234567890123456789"]

[transfer]
staging_dir = "/var/cache/shoebox"
"#;

        let settings = Settings::from_toml(toml).unwrap();

        assert_eq!(settings.asset.endpoint, "https://photos.example.com");
        assert_eq!(
            settings.discord.authorized_user_ids,
            vec![
                "123456789012345678".to_string(),
                "234567890123456789".to_string()
            ]
        );
        assert_eq!(settings.transfer.staging_dir, "/var/cache/shoebox");
    }

    #[test]
    fn test_from_toml_partial() {
        // Test that partial config fills in defaults
        let toml = r#"
[asset]
endpoint = "https://photos.example.com"
"#;

        let settings = Settings::from_toml(toml).unwrap();

        // Other values should use defaults
        assert_eq!(settings.asset.endpoint, "https://photos.example.com");
        assert!(settings.discord.authorized_user_ids.is_empty());
        assert_eq!(settings.transfer.staging_dir, "/tmp/shoebox");
    }

    #[test]
    fn test_settings_survive_toml_roundtrip() {
        let mut settings = Settings::default();
        settings.asset.endpoint = "https://photos.example.com".to_string();
        settings
            .discord
            .authorized_user_ids
            .push("123456789012345678".to_string());
        settings.transfer.staging_dir = "/var/cache/shoebox".to_string();

        let content = settings.to_toml().expect("serialize failed");
        let loaded = Settings::from_toml(&content).expect("parse failed");

        assert_eq!(loaded.asset.endpoint, "https://photos.example.com");
        assert_eq!(
            loaded.discord.authorized_user_ids,
            vec!["123456789012345678".to_string()]
        );
        assert_eq!(loaded.transfer.staging_dir, "/var/cache/shoebox");
    }

    #[test]
    fn test_config_path_uses_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let value = dir.path().to_string_lossy().to_string();

        // SAFETY: test-scoped env mutation.
        unsafe { std::env::set_var("SHOEBOX_CONFIG_DIR", &value) };
        let path = Settings::config_path().unwrap();
        // SAFETY: test-scoped env mutation cleanup.
        unsafe { std::env::remove_var("SHOEBOX_CONFIG_DIR") };

        assert_eq!(path, dir.path().join("config.toml"));
    }
}
