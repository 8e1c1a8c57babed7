//! Answers reported by transfer agents.

use serde::{Deserialize, Serialize};

use crate::record::DownloadStatus;

/// Progress or outcome of a remote transfer job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadAnswer {
    /// Remote job id, once the agent has assigned one.
    pub job_id: Option<String>,
    /// Reported status.
    pub status: DownloadStatus,
    /// Percent complete (0..=100).
    pub progress_percent: u8,
    /// Failure detail.
    pub error: Option<String>,
    /// Where the image ended up on the store.
    pub install_path: Option<String>,
    /// Virtual size in bytes.
    pub size: u64,
    /// Bytes used on the store.
    pub physical_size: u64,
    /// Checksum computed by the agent.
    pub checksum: Option<String>,
}

impl DownloadAnswer {
    /// Answer with only a status.
    pub fn new(status: DownloadStatus) -> Self {
        Self {
            job_id: None,
            status,
            progress_percent: 0,
            error: None,
            install_path: None,
            size: 0,
            physical_size: 0,
            checksum: None,
        }
    }

    /// Failure answer carrying an error message.
    pub fn failed(status: DownloadStatus, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(status)
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_progress(mut self, percent: u8) -> Self {
        self.progress_percent = percent.min(100);
        self
    }

    pub fn with_install_path(mut self, path: impl Into<String>) -> Self {
        self.install_path = Some(path.into());
        self
    }

    pub fn with_size(mut self, size: u64, physical_size: u64) -> Self {
        self.size = size;
        self.physical_size = physical_size;
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Error text, falling back to the status name.
    pub fn error_detail(&self) -> String {
        self.error
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("transfer ended with status {}", self.status))
    }
}
