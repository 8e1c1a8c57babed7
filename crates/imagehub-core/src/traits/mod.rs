//! Core traits defined in `imagehub-core` and implemented by other crates.

pub mod config_provider;

pub use config_provider::ConfigProvider;
