//! Transfer listener timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs for transfer job listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Interval in milliseconds between status polls of a running job.
    #[serde(default = "default_status_poll_interval")]
    pub status_poll_interval_ms: u64,
    /// Delay in milliseconds before the first status check after a
    /// communication failure.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl TransferConfig {
    /// Status poll interval as a [`Duration`].
    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }

    /// First retry delay as a [`Duration`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            status_poll_interval_ms: default_status_poll_interval(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_status_poll_interval() -> u64 {
    10_000
}

fn default_retry_delay() -> u64 {
    100
}
