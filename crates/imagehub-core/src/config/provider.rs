//! [`ConfigProvider`] implementations.

use std::collections::HashMap;

use crate::error::AppError;
use crate::traits::ConfigProvider;

use super::layered_source;

/// Key/value provider backed by the layered TOML + environment source.
///
/// Dotted keys address nested tables, so `secstorage.proxy` reads
/// `proxy` from the `[secstorage]` table or `IMAGEHUB__SECSTORAGE__PROXY`.
#[derive(Debug, Clone)]
pub struct LayeredConfigProvider {
    source: config::Config,
}

impl LayeredConfigProvider {
    /// Load the layered source for an environment.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Ok(Self::from_source(layered_source(env)?))
    }

    /// Wrap an already built source.
    pub fn from_source(source: config::Config) -> Self {
        Self { source }
    }

    /// Access the underlying source.
    pub fn source(&self) -> &config::Config {
        &self.source
    }
}

impl ConfigProvider for LayeredConfigProvider {
    fn get_value(&self, key: &str) -> Option<String> {
        self.source.get_string(key).ok()
    }
}

/// Fixed in-memory provider, used when values come from another system
/// or in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    values: HashMap<String, String>,
}

impl StaticConfigProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn get_value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl From<HashMap<String, String>> for StaticConfigProvider {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}
