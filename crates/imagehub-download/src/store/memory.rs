//! In-memory record store backed by a concurrent map.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use imagehub_core::error::AppError;
use imagehub_core::result::AppResult;
use imagehub_core::types::{ResourceId, StoreId};
use imagehub_entity::{JobIdentity, JobRecord, ResourceKind};

use crate::traits::RecordStore;

/// Record store keeping job records in memory.
///
/// Suitable for single-node deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    /// Records keyed by identity; destroyed rows stay until replaced.
    records: Arc<DashMap<JobIdentity, JobRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, destroyed ones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(&self, identity: &JobIdentity) -> AppResult<Option<JobRecord>> {
        Ok(self
            .records
            .get(identity)
            .filter(|record| !record.is_destroyed())
            .map(|record| record.value().clone()))
    }

    async fn find_by_resource_store(
        &self,
        kind: ResourceKind,
        resource_id: ResourceId,
        store_id: StoreId,
    ) -> AppResult<Vec<JobRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| {
                let id = entry.key();
                id.kind == kind && id.resource_id == resource_id && id.store_id == store_id
            })
            .filter(|entry| !entry.value().is_destroyed())
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn persist(&self, mut record: JobRecord) -> AppResult<JobRecord> {
        let identity = record.identity();
        if record.created().is_none() {
            record.set_created(Some(Utc::now()));
        }

        match self.records.entry(identity) {
            Entry::Occupied(entry) if !entry.get().is_destroyed() => Err(AppError::conflict(
                format!("A live job record already exists for {identity}"),
            )),
            Entry::Occupied(mut entry) => {
                debug!(%identity, "Replacing destroyed job record");
                entry.insert(record.clone());
                Ok(record)
            }
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update(&self, record: &JobRecord) -> AppResult<bool> {
        let identity = record.identity();
        let mut stored = self
            .records
            .get_mut(&identity)
            .ok_or_else(|| AppError::not_found(format!("No job record for {identity}")))?;

        if stored.updated_count() + 1 != record.updated_count() {
            debug!(
                %identity,
                stored = stored.updated_count(),
                incoming = record.updated_count(),
                "Rejected stale job record update"
            );
            return Ok(false);
        }

        *stored = record.clone();
        Ok(true)
    }
}
