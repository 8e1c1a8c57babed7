//! Immutable identity of a transfer job.

use std::fmt;

use serde::{Deserialize, Serialize};

use imagehub_core::types::{ResourceId, StoreId};

/// Kind of resource being transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A disk image template.
    Template,
    /// A data volume.
    Volume,
}

impl ResourceKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role a store plays in the storage topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    /// Primary storage attached to hypervisors.
    Primary,
    /// Secondary image store.
    Image,
    /// Staging cache in front of an image store.
    ImageCache,
    /// Backup target.
    Backup,
}

impl StoreRole {
    /// Return the role as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Image => "image",
            Self::ImageCache => "image_cache",
            Self::Backup => "backup",
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key under which at most one live transfer job may exist.
///
/// Never changes once a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity {
    /// Template or volume.
    pub kind: ResourceKind,
    /// Resource being transferred.
    pub resource_id: ResourceId,
    /// Destination store.
    pub store_id: StoreId,
    /// Role of the destination store.
    pub store_role: StoreRole,
}

impl JobIdentity {
    /// Create a new identity.
    pub fn new(
        kind: ResourceKind,
        resource_id: ResourceId,
        store_id: StoreId,
        store_role: StoreRole,
    ) -> Self {
        Self {
            kind,
            resource_id,
            store_id,
            store_role,
        }
    }

    /// Identity of a template transfer.
    pub fn template(resource_id: ResourceId, store_id: StoreId, store_role: StoreRole) -> Self {
        Self::new(ResourceKind::Template, resource_id, store_id, store_role)
    }

    /// Identity of a volume transfer.
    pub fn volume(resource_id: ResourceId, store_id: StoreId, store_role: StoreRole) -> Self {
        Self::new(ResourceKind::Volume, resource_id, store_id, store_role)
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}:{}",
            self.kind, self.resource_id, self.store_role, self.store_id
        )
    }
}
