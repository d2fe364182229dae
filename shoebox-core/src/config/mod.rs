//! Configuration management for shoebox.
//!
//! This module provides a unified configuration system that separates
//! secrets (from environment variables) from settings (from TOML files).
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `DISCORD_BOT_TOKEN` - Discord bot token
//! - `ASSET_API_KEY` - Asset service API key
//!
//! ## Settings (TOML File)
//! Located at `~/.config/shoebox/config.toml`:
//! ```toml
//! [asset]
//! endpoint = "https://photos.example.com"
//!
//! [discord]
//! authorized_user_ids = ["123456789012345678"]
//!
//! [transfer]
//! staging_dir = "/tmp/shoebox"
//! ```

mod secrets;
mod settings;

use std::collections::HashSet;
use std::path::PathBuf;

pub use secrets::{Secrets, SecretsError};
pub use settings::{AssetSettings, DiscordSettings, Settings, SettingsError, TransferSettings};

/// Combined configuration containing both secrets and settings.
///
/// This is the main configuration type used throughout the application.
/// It separates sensitive secrets (from env) from non-sensitive settings (from TOML).
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// This loads:
    /// 1. Secrets from environment variables
    /// 2. Settings from TOML file (creating defaults if needed)
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file cannot be read or parsed, or
    /// if required values are missing or malformed. Value problems are
    /// collected across both sources and reported in one error.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Settings::load()?;
        Self::from_parts(Secrets::from_env(), settings)
    }

    /// Combine the two configuration sources.
    ///
    /// Secrets and settings are checked together so one startup error
    /// names every missing value, not just the first.
    fn from_parts(
        secrets: Result<Secrets, SecretsError>,
        settings: Settings,
    ) -> Result<Self, ConfigError> {
        let mut problems = Vec::new();
        if let Err(ref err) = secrets {
            problems.push(err.to_string());
        }
        problems.extend(Self::settings_problems(&settings));

        match secrets {
            Ok(secrets) if problems.is_empty() => Ok(Self { secrets, settings }),
            _ => Err(ConfigError::InvalidConfiguration(problems.join("; "))),
        }
    }

    /// Check settings invariants the serde layer cannot express.
    ///
    /// Returns one line per failed check; an empty list means the
    /// settings are usable.
    fn settings_problems(settings: &Settings) -> Vec<String> {
        let mut problems = Vec::new();

        if settings.asset.endpoint.trim().is_empty() {
            problems.push("asset.endpoint is not set".to_string());
        }

        if settings.discord.authorized_user_ids.is_empty() {
            problems.push("discord.authorized_user_ids is empty".to_string());
        }
        for id in &settings.discord.authorized_user_ids {
            if id.trim().parse::<u64>().is_err() {
                problems.push(format!(
                    "discord.authorized_user_ids entry '{}' is not a numeric user ID",
                    id
                ));
            }
        }

        if settings.transfer.staging_dir.trim().is_empty() {
            problems.push("transfer.staging_dir is not set".to_string());
        }

        problems
    }

    /// Get the Discord bot token (if configured).
    pub fn discord_bot_token(&self) -> Option<&str> {
        self.secrets.discord_bot_token.as_deref()
    }

    /// Get the asset service API key (if configured).
    pub fn asset_api_key(&self) -> Option<&str> {
        self.secrets.asset_api_key.as_deref()
    }

    /// Get the asset service base URL, without trailing slashes.
    pub fn asset_endpoint(&self) -> &str {
        self.settings.asset.endpoint.trim().trim_end_matches('/')
    }

    /// Get the set of user IDs allowed to trigger the backup command.
    ///
    /// IDs are validated during [`Config::load`]; unparseable entries
    /// cannot survive to this point.
    pub fn authorized_user_ids(&self) -> HashSet<u64> {
        self.settings
            .discord
            .authorized_user_ids
            .iter()
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }

    /// Get the staging directory for attachment transfers.
    pub fn staging_dir(&self) -> PathBuf {
        PathBuf::from(&self.settings.transfer.staging_dir)
    }
}
