//! Application configuration schemas.
//!
//! Typed sections are deserialized from TOML files via the `config`
//! crate. The same layered source also backs the raw key/value lookups
//! served by [`provider::LayeredConfigProvider`].

pub mod logging;
pub mod provider;
pub mod transfer;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::provider::{LayeredConfigProvider, StaticConfigProvider};
pub use self::transfer::TransferConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "IMAGEHUB";

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `IMAGEHUB__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Transfer listener timing settings.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `IMAGEHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::from_source(&layered_source(env)?)
    }

    /// Deserialize the typed sections from an already built source.
    pub fn from_source(source: &config::Config) -> Result<Self, AppError> {
        source
            .clone()
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

/// Build the layered configuration source for an environment.
pub fn layered_source(env: &str) -> Result<config::Config, AppError> {
    config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{env}")).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))
}
