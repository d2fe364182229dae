//! Secrets configuration loaded from environment variables only.
//!
//! This module handles sensitive configuration like API keys that should
//! never be stored in files. All secrets are read from environment variables.

use std::env;

/// Secrets loaded exclusively from environment variables.
///
/// These are sensitive values that should never be written to disk
/// or committed to version control.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Discord bot token (env: DISCORD_BOT_TOKEN)
    pub discord_bot_token: Option<String>,

    /// Asset service API key (env: ASSET_API_KEY)
    pub asset_api_key: Option<String>,
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secrets: {0}")]
    MissingSecrets(String),
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// This function also loads .env file if present (for development),
    /// but production should rely on actual environment variables.
    pub fn from_env() -> Result<Self, SecretsError> {
        // Load .env file if present (development convenience)
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        let secrets = Self {
            discord_bot_token: env::var("DISCORD_BOT_TOKEN").ok(),
            asset_api_key: env::var("ASSET_API_KEY").ok(),
        };

        // Every missing variable is reported in one error, not one at a time
        let mut missing = Vec::new();
        if secrets.discord_bot_token.is_none() {
            missing.push("DISCORD_BOT_TOKEN");
        }
        if secrets.asset_api_key.is_none() {
            missing.push("ASSET_API_KEY");
        }
        if !missing.is_empty() {
            return Err(SecretsError::MissingSecrets(missing.join(", ")));
        }

        Ok(secrets)
    }
}
