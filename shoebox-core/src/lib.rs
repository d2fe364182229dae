//! Core configuration for shoebox.
//!
//! Holds the configuration layer shared by the gateway binary:
//! secrets from environment variables, settings from a TOML file,
//! and the combined validated [`Config`].

pub mod config;

pub use config::{Config, ConfigError, Secrets, SecretsError, Settings, SettingsError};
