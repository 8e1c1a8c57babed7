//! ImageHub: transfer of disk images into managed storage pools.
//!
//! The workspace is split into layered crates; this facade re-exports them
//! and wires a ready-to-use [`DownloadMonitor`] from configuration.
//!
//! - [`imagehub_core`]: configuration, errors, logging
//! - [`imagehub_entity`]: job records, commands and answers
//! - [`imagehub_download`]: registry, listeners and the monitor

pub mod bootstrap;

pub use imagehub_core;
pub use imagehub_download;
pub use imagehub_entity;

pub use bootstrap::{bootstrap, build_monitor, current_env};
pub use imagehub_core::{AppError, AppResult};
pub use imagehub_download::{DownloadMonitor, Endpoint, EndpointSelector, RecordStore};
