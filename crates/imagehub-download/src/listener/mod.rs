//! Per-job listeners.
//!
//! A listener follows one dispatched transfer until it ends: it applies
//! agent answers to the job record, polls the agent when answers stop, and
//! calls the submitter back exactly once. Each listener runs as its own
//! task; the [`ListenerHandle`] is the only way to reach it.

mod actor;
pub mod handle;
pub mod state;

use std::sync::Arc;

use imagehub_core::config::TransferConfig;
use imagehub_entity::{AgentCommand, DownloadStatus, JobIdentity};

use crate::outcome::CompletionCallback;
use crate::registry::JobRegistry;
use crate::traits::{Endpoint, RecordStore};

pub use handle::{AnswerSink, ListenerHandle, ListenerId};
pub use state::{ListenerSnapshot, ListenerState};

/// Everything a listener needs to follow one job.
pub struct ListenerParams {
    pub identity: JobIdentity,
    /// Agent the command goes to; status checks follow the same route.
    pub endpoint: Arc<dyn Endpoint>,
    /// The command as first dispatched.
    pub command: AgentCommand,
    pub store: Arc<dyn RecordStore>,
    /// Registry the listener removes itself from once it ends.
    pub registry: Arc<JobRegistry>,
    pub timing: TransferConfig,
    /// Status restored from the record when resuming a remote job.
    pub prior_status: Option<DownloadStatus>,
    /// Remote job id, when already known.
    pub job_id: Option<String>,
    pub callback: Option<CompletionCallback>,
}
