//! Collaborators the orchestration layer consumes.

use std::sync::Arc;

use async_trait::async_trait;

use imagehub_core::result::AppResult;
use imagehub_core::types::{ResourceId, StoreId};
use imagehub_entity::{AgentCommand, JobIdentity, JobRecord, ResourceDescriptor, ResourceKind};

use crate::listener::AnswerSink;

/// Durable storage of job records.
///
/// Implementations must tolerate concurrent callers; the orchestration
/// layer takes no lock around store access.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find the live (non-destroyed) record for an identity.
    async fn find(&self, identity: &JobIdentity) -> AppResult<Option<JobRecord>>;

    /// Find live records for a resource in a store, across store roles.
    async fn find_by_resource_store(
        &self,
        kind: ResourceKind,
        resource_id: ResourceId,
        store_id: StoreId,
    ) -> AppResult<Vec<JobRecord>>;

    /// Insert a new record. Fails with a conflict if a live record
    /// already exists for the identity.
    async fn persist(&self, record: JobRecord) -> AppResult<JobRecord>;

    /// Replace a record. Returns `false` when the record's update counter
    /// does not advance the stored counter by exactly one.
    async fn update(&self, record: &JobRecord) -> AppResult<bool>;
}

/// Picks the agent that should run a transfer.
#[async_trait]
pub trait EndpointSelector: Send + Sync + std::fmt::Debug + 'static {
    /// Return an endpoint able to serve `resource`, if any is up.
    async fn select(&self, resource: &ResourceDescriptor) -> Option<Arc<dyn Endpoint>>;
}

/// A remote transfer agent.
#[async_trait]
pub trait Endpoint: Send + Sync + std::fmt::Debug + 'static {
    /// Stable identifier of the agent.
    fn id(&self) -> &str;

    /// Hand a command to the agent without waiting for its outcome.
    ///
    /// An `Err` means the command never left; answers and later transport
    /// failures are reported through `sink`.
    async fn send_async(&self, command: AgentCommand, sink: AnswerSink) -> AppResult<()>;
}
