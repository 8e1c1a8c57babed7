//! Process-level wiring: configuration, logging and the download monitor.

use std::sync::Arc;

use imagehub_core::config::{AppConfig, LayeredConfigProvider, layered_source};
use imagehub_core::logging::init_logging;
use imagehub_core::result::AppResult;
use imagehub_core::traits::ConfigProvider;
use imagehub_download::{DownloadMonitor, EndpointSelector, RecordStore};

/// Environment variable selecting the configuration overlay.
pub const ENV_VAR: &str = "IMAGEHUB_ENV";

/// Configuration environment, `development` unless overridden.
pub fn current_env() -> String {
    std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string())
}

/// Load configuration, install the global logger and build a monitor
/// backed by `store` and `selector`.
///
/// Call once per process: the logger can only be installed once.
pub fn bootstrap(
    store: Arc<dyn RecordStore>,
    selector: Arc<dyn EndpointSelector>,
) -> AppResult<DownloadMonitor> {
    let env = current_env();
    let source = layered_source(&env)?;
    let config = AppConfig::from_source(&source)?;

    init_logging(&config.logging)?;
    tracing::info!(
        "Starting ImageHub v{} (env: {})",
        env!("CARGO_PKG_VERSION"),
        env
    );

    let settings = Arc::new(LayeredConfigProvider::from_source(source));
    Ok(build_monitor(&config, store, selector, settings))
}

/// Build a monitor from already loaded configuration.
pub fn build_monitor(
    config: &AppConfig,
    store: Arc<dyn RecordStore>,
    selector: Arc<dyn EndpointSelector>,
    settings: Arc<dyn ConfigProvider>,
) -> DownloadMonitor {
    tracing::debug!(
        poll_interval_ms = config.transfer.status_poll_interval_ms,
        retry_delay_ms = config.transfer.retry_delay_ms,
        "Building download monitor"
    );
    DownloadMonitor::new(store, selector, settings, config.transfer.clone())
}
