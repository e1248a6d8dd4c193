//! Configuration management for the Blending Operations Suite
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with BOPS_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::BlendingSettings;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Completion email settings; absent disables email
    #[serde(default)]
    pub notification: Option<NotificationConfig>,

    /// Document library settings; absent disables uploads
    #[serde(default)]
    pub export: Option<ExportConfig>,

    /// Calculator settings
    #[serde(default)]
    pub blending: BlendingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Mail relay endpoint accepting JSON messages
    pub endpoint: String,

    /// Mail relay API key
    pub api_key: String,

    /// Sender address
    pub from_address: String,

    /// Fixed distribution list that receives completed batches
    pub distribution_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Root URL of the document library
    pub library_url: String,

    /// Bearer token for the document library
    pub access_token: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BlendingConfig {
    /// Overrides the built-in 3% waste margin when set
    pub default_error_margin: Option<Decimal>,
}

impl BlendingConfig {
    pub fn settings(&self) -> BlendingSettings {
        BlendingSettings::with_error_margin_override(self.default_error_margin)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BOPS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BOPS_ prefix)
            .add_source(
                Environment::with_prefix("BOPS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_blending_settings_default_margin() {
        let settings = BlendingConfig::default().settings();
        assert_eq!(*settings.error_margin_percent.effective(), Decimal::from(3));
    }

    #[test]
    fn test_blending_settings_override() {
        let config = BlendingConfig {
            default_error_margin: Some(Decimal::from_str("5").unwrap()),
        };
        assert_eq!(*config.settings().error_margin_percent.effective(), Decimal::from(5));
    }
}
