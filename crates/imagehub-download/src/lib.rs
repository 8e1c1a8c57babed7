//! Transfer job orchestration for ImageHub.
//!
//! This crate provides:
//! - A [`DownloadMonitor`] that decides whether a transfer is needed, builds
//!   or resumes the agent command and dispatches it
//! - A [`JobRegistry`] guaranteeing one live job per resource/store identity
//! - A per-job listener actor that applies agent answers to the job record
//!   and polls the agent when answers stop arriving
//! - The collaborator traits the orchestration layer consumes, plus an
//!   in-memory record store

pub mod listener;
pub mod monitor;
pub mod outcome;
pub mod registry;
pub mod settings;
pub mod store;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use listener::{
    AnswerSink, ListenerHandle, ListenerId, ListenerParams, ListenerSnapshot, ListenerState,
};
pub use monitor::DownloadMonitor;
pub use outcome::{CompletionCallback, TransferFailure, TransferOutcome};
pub use registry::JobRegistry;
pub use settings::CopySettings;
pub use store::MemoryRecordStore;
pub use traits::{Endpoint, EndpointSelector, RecordStore};
