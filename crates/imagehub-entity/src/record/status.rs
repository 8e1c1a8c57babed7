//! Transfer status and lifecycle state enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by transfer agents and persisted on the job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadStatus {
    /// No transfer has started yet.
    NotDownloaded,
    /// The agent is fetching the image.
    DownloadInProgress,
    /// The image is installed on the store.
    Downloaded,
    /// The fetch failed.
    DownloadError,
    /// The image is being pushed by a client upload.
    UploadInProgress,
    /// The client upload failed.
    UploadError,
    /// The agent is post-processing the image.
    Creating,
    /// The job was given up on.
    Abandoned,
}

impl DownloadStatus {
    /// Statuses that block a new submission for the same resource/store.
    pub fn blocks_resubmission(&self) -> bool {
        matches!(self, Self::DownloadInProgress | Self::Downloaded)
    }

    /// Whether the agent reported definitive success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Downloaded)
    }

    /// Whether the agent reported definitive failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::DownloadError | Self::UploadError | Self::Abandoned)
    }

    /// Whether no further answers are expected after this status.
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_failure()
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotDownloaded => "NOT_DOWNLOADED",
            Self::DownloadInProgress => "DOWNLOAD_IN_PROGRESS",
            Self::Downloaded => "DOWNLOADED",
            Self::DownloadError => "DOWNLOAD_ERROR",
            Self::UploadInProgress => "UPLOAD_IN_PROGRESS",
            Self::UploadError => "UPLOAD_ERROR",
            Self::Creating => "CREATING",
            Self::Abandoned => "ABANDONED",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a data object inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectState {
    /// Record exists, nothing has happened yet.
    Allocated,
    /// Content is being produced.
    Creating,
    /// Content is usable.
    Ready,
    /// Content could not be produced.
    Failed,
    /// Record is logically removed.
    Destroyed,
}

impl ObjectState {
    /// Return the state as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allocated => "Allocated",
            Self::Creating => "Creating",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
            Self::Destroyed => "Destroyed",
        }
    }
}

impl From<DownloadStatus> for ObjectState {
    fn from(status: DownloadStatus) -> Self {
        match status {
            DownloadStatus::Downloaded => Self::Ready,
            DownloadStatus::Creating
            | DownloadStatus::DownloadInProgress
            | DownloadStatus::UploadInProgress => Self::Creating,
            DownloadStatus::DownloadError | DownloadStatus::UploadError => Self::Failed,
            DownloadStatus::Abandoned => Self::Destroyed,
            DownloadStatus::NotDownloaded => Self::Allocated,
        }
    }
}

impl fmt::Display for ObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
