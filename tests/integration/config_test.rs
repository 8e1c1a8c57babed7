//! Integration tests for configuration loading and monitor wiring.

mod helpers;

use std::sync::Arc;

use imagehub::build_monitor;
use imagehub::imagehub_core::config::{AppConfig, LayeredConfigProvider};
use imagehub::imagehub_core::traits::ConfigProvider;
use imagehub::imagehub_download::MemoryRecordStore;

use helpers::{FakeAgent, FakeSelector};

#[test]
fn test_default_file_is_loaded() {
    let config = AppConfig::load("integration").expect("Failed to load config");

    assert_eq!(config.transfer.status_poll_interval_ms, 10_000);
    assert_eq!(config.transfer.retry_delay_ms, 100);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_raw_settings_come_from_the_same_layers() {
    let provider = LayeredConfigProvider::load("integration").expect("Failed to load config");

    assert_eq!(
        provider.get_value("max.template.iso.size").as_deref(),
        Some("50")
    );
    assert_eq!(
        provider.get_value("secstorage.encrypt.copy").as_deref(),
        Some("false")
    );
    assert_eq!(provider.get_value("secstorage.proxy"), None);
}

#[tokio::test]
async fn test_monitor_reads_overridden_settings() {
    let source = config::Config::builder()
        .set_override("transfer.status_poll_interval_ms", 250)
        .unwrap()
        .set_override("max.template.iso.size", "7")
        .unwrap()
        .set_override("secstorage.proxy", "http://proxy.local:8080")
        .unwrap()
        .build()
        .unwrap();
    let config = AppConfig::from_source(&source).unwrap();
    assert_eq!(config.transfer.status_poll_interval_ms, 250);

    let monitor = build_monitor(
        &config,
        Arc::new(MemoryRecordStore::new()),
        Arc::new(FakeSelector::new(FakeAgent::new("ssvm-1"))),
        Arc::new(LayeredConfigProvider::from_source(source)),
    );

    assert_eq!(monitor.max_template_size_bytes(), Some(7 * 1024 * 1024 * 1024));
    assert_eq!(monitor.max_volume_size_bytes(), None);
    let proxy = monitor.copy_settings().proxy.as_ref().unwrap();
    assert_eq!(proxy.host, "proxy.local");
    assert_eq!(proxy.port, 8080);
}
