//! What a caller learns when a transfer job ends.

use imagehub_entity::{DownloadAnswer, DownloadStatus, JobIdentity};

/// Definitive failure reported by the agent.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transfer {identity} ended with {status}: {message}")]
pub struct TransferFailure {
    /// Job that failed.
    pub identity: JobIdentity,
    /// Terminal status reported by the agent.
    pub status: DownloadStatus,
    /// Error detail.
    pub message: String,
    /// The full failure answer.
    pub answer: DownloadAnswer,
}

impl TransferFailure {
    /// Build a failure from a terminal failure answer.
    pub fn from_answer(identity: JobIdentity, answer: DownloadAnswer) -> Self {
        Self {
            identity,
            status: answer.status,
            message: answer.error_detail(),
            answer,
        }
    }
}

/// Result handed to the completion callback.
pub type TransferOutcome = Result<DownloadAnswer, TransferFailure>;

/// Invoked at most once, when the owning listener reaches a terminal state.
///
/// Never invoked by a listener that was displaced by a newer submission.
pub type CompletionCallback = Box<dyn FnOnce(TransferOutcome) + Send + 'static>;
