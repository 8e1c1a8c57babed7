//! Job record entity model.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use imagehub_core::types::{ResourceId, StoreId};

use super::identity::{JobIdentity, ResourceKind, StoreRole};
use super::status::{DownloadStatus, ObjectState};
use crate::command::DownloadAnswer;
use crate::resource::ImageFormat;

/// Job ids this short are placeholders and never name a remote job.
const MIN_RESUMABLE_JOB_ID_LEN: usize = 3;

/// Durable state of one resource transfer into one store.
///
/// Equality and hashing only consider `(resource_id, store_id)` so two
/// snapshots of the same row compare equal regardless of progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    kind: ResourceKind,
    resource_id: ResourceId,
    store_id: StoreId,
    store_role: StoreRole,
    state: ObjectState,
    download_status: Option<DownloadStatus>,
    progress_percent: u8,
    size: u64,
    physical_size: u64,
    install_path: Option<String>,
    local_path: Option<String>,
    url: Option<String>,
    checksum: Option<String>,
    format: Option<ImageFormat>,
    job_id: Option<String>,
    error_message: Option<String>,
    is_copy: bool,
    destroyed: bool,
    updated_count: u64,
    created: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Bare record, populated field by field afterwards.
    pub fn empty() -> Self {
        Self {
            kind: ResourceKind::Template,
            resource_id: ResourceId(0),
            store_id: StoreId(0),
            store_role: StoreRole::Image,
            state: ObjectState::Allocated,
            download_status: None,
            progress_percent: 0,
            size: 0,
            physical_size: 0,
            install_path: None,
            local_path: None,
            url: None,
            checksum: None,
            format: None,
            job_id: None,
            error_message: None,
            is_copy: false,
            destroyed: false,
            updated_count: 0,
            created: None,
            last_updated: None,
            updated: None,
        }
    }

    /// Record for a resource/store pair in the `Allocated` state, with no
    /// transfer status yet.
    pub fn new(identity: JobIdentity) -> Self {
        let mut record = Self::empty();
        record.set_identity(identity);
        record.created = Some(Utc::now());
        record
    }

    /// Record built from a legacy status snapshot; the lifecycle state is
    /// derived from `status`.
    pub fn from_snapshot(
        identity: JobIdentity,
        status: DownloadStatus,
        progress_percent: u8,
        job_id: Option<String>,
        install_path: Option<String>,
        url: Option<String>,
    ) -> Self {
        let mut record = Self::new(identity);
        record.state = ObjectState::from(status);
        record.download_status = Some(status);
        record.progress_percent = progress_percent.min(100);
        record.job_id = job_id;
        record.install_path = install_path;
        record.url = url;
        record.last_updated = record.created;
        record
    }

    /// Move to `status`, keeping the lifecycle state in step.
    ///
    /// This is the only way to change either field after construction.
    pub fn apply_status(&mut self, status: DownloadStatus) {
        self.download_status = Some(status);
        self.state = ObjectState::from(status);
        self.updated = Some(Utc::now());
    }

    /// Fold an agent answer into the record and bump the update counter.
    pub fn apply_answer(&mut self, answer: &DownloadAnswer) {
        self.apply_status(answer.status);
        self.progress_percent = answer.progress_percent.min(100);
        if let Some(job_id) = answer.job_id.as_ref().filter(|id| !id.is_empty()) {
            self.job_id = Some(job_id.clone());
        }
        if answer.install_path.is_some() {
            self.install_path = answer.install_path.clone();
        }
        if answer.size > 0 {
            self.size = answer.size;
        }
        if answer.physical_size > 0 {
            self.physical_size = answer.physical_size;
        }
        if answer.checksum.is_some() {
            self.checksum = answer.checksum.clone();
        }
        self.error_message = if answer.status.is_failure() {
            answer.error.clone()
        } else {
            None
        };
        self.last_updated = Some(Utc::now());
        self.incr_updated_count();
    }

    /// Whether the record names a remote job that can be resumed.
    pub fn has_resumable_job(&self) -> bool {
        self.job_id
            .as_ref()
            .is_some_and(|id| id.len() >= MIN_RESUMABLE_JOB_ID_LEN)
    }

    /// Whether the current status blocks a new submission.
    pub fn blocks_resubmission(&self) -> bool {
        self.download_status
            .is_some_and(|status| status.blocks_resubmission())
    }

    /// Identity key of this record.
    pub fn identity(&self) -> JobIdentity {
        JobIdentity::new(self.kind, self.resource_id, self.store_id, self.store_role)
    }

    /// Overwrite the identity fields.
    pub fn set_identity(&mut self, identity: JobIdentity) {
        self.kind = identity.kind;
        self.resource_id = identity.resource_id;
        self.store_id = identity.store_id;
        self.store_role = identity.store_role;
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn resource_id(&self) -> ResourceId {
        self.resource_id
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    pub fn store_role(&self) -> StoreRole {
        self.store_role
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn download_status(&self) -> Option<DownloadStatus> {
        self.download_status
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn set_progress_percent(&mut self, percent: u8) {
        self.progress_percent = percent.min(100);
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    pub fn physical_size(&self) -> u64 {
        self.physical_size
    }

    pub fn set_physical_size(&mut self, size: u64) {
        self.physical_size = size;
    }

    pub fn install_path(&self) -> Option<&str> {
        self.install_path.as_deref()
    }

    pub fn set_install_path(&mut self, path: Option<String>) {
        self.install_path = path;
    }

    pub fn local_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }

    pub fn set_local_path(&mut self, path: Option<String>) {
        self.local_path = path;
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: Option<String>) {
        self.url = url;
    }

    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn set_checksum(&mut self, checksum: Option<String>) {
        self.checksum = checksum;
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn set_format(&mut self, format: Option<ImageFormat>) {
        self.format = format;
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn set_job_id(&mut self, job_id: Option<String>) {
        self.job_id = job_id;
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_error_message(&mut self, message: Option<String>) {
        self.error_message = message;
    }

    pub fn is_copy(&self) -> bool {
        self.is_copy
    }

    pub fn set_copy(&mut self, is_copy: bool) {
        self.is_copy = is_copy;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn set_destroyed(&mut self, destroyed: bool) {
        self.destroyed = destroyed;
    }

    /// Optimistic-concurrency counter.
    pub fn updated_count(&self) -> u64 {
        self.updated_count
    }

    pub fn incr_updated_count(&mut self) {
        self.updated_count += 1;
    }

    pub fn decr_updated_count(&mut self) {
        self.updated_count = self.updated_count.saturating_sub(1);
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn set_created(&mut self, created: Option<DateTime<Utc>>) {
        self.created = created;
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn set_last_updated(&mut self, at: Option<DateTime<Utc>>) {
        self.last_updated = at;
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }
}

impl Default for JobRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for JobRecord {
    fn eq(&self, other: &Self) -> bool {
        self.resource_id == other.resource_id && self.store_id == other.store_id
    }
}

impl Eq for JobRecord {}

impl Hash for JobRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource_id.hash(state);
        self.store_id.hash(state);
    }
}
