//! Resource descriptor models.

use serde::{Deserialize, Serialize};

use imagehub_core::types::{ResourceId, StoreId};

use super::format::ImageFormat;
use crate::record::{JobIdentity, ResourceKind, StoreRole};

/// Destination store of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRef {
    /// Store identifier.
    pub id: StoreId,
    /// Role of the store.
    pub role: StoreRole,
    /// Display name, used in log messages.
    pub name: String,
}

impl StoreRef {
    /// Create a store reference.
    pub fn new(id: StoreId, role: StoreRole, name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            name: name.into(),
        }
    }
}

/// What endpoint selection needs to know about a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Template or volume.
    pub kind: ResourceKind,
    /// Resource identifier.
    pub id: ResourceId,
    /// Destination store.
    pub store: StoreRef,
}

impl ResourceDescriptor {
    /// Identity of the transfer job for this resource.
    pub fn identity(&self) -> JobIdentity {
        JobIdentity::new(self.kind, self.id, self.store.id, self.store.role)
    }
}

/// A template to be transferred into an image store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateResource {
    /// Template identifier.
    pub id: ResourceId,
    /// Template name.
    pub name: String,
    /// Destination store.
    pub store: StoreRef,
    /// Source URL; templates without one are not transferred.
    pub url: Option<String>,
    /// Expected checksum.
    pub checksum: Option<String>,
    /// Image format.
    pub format: Option<ImageFormat>,
}

impl TemplateResource {
    /// Descriptor for endpoint selection.
    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            kind: ResourceKind::Template,
            id: self.id,
            store: self.store.clone(),
        }
    }

    /// Identity of the transfer job.
    pub fn identity(&self) -> JobIdentity {
        JobIdentity::template(self.id, self.store.id, self.store.role)
    }
}

/// Caller-supplied metadata for registering a volume from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterVolumePayload {
    /// Source URL.
    pub url: String,
    /// Expected checksum.
    pub checksum: Option<String>,
    /// Image format name, parsed strictly at submission.
    pub format: String,
}

/// A volume to be transferred into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeResource {
    /// Volume identifier.
    pub id: ResourceId,
    /// Volume name.
    pub name: String,
    /// Destination store.
    pub store: StoreRef,
    /// Registration metadata.
    pub payload: RegisterVolumePayload,
}

impl VolumeResource {
    /// Descriptor for endpoint selection.
    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            kind: ResourceKind::Volume,
            id: self.id,
            store: self.store.clone(),
        }
    }

    /// Identity of the transfer job.
    pub fn identity(&self) -> JobIdentity {
        JobIdentity::volume(self.id, self.store.id, self.store.role)
    }
}
