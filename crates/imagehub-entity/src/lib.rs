//! # imagehub-entity
//!
//! Domain entity models for ImageHub transfers: the per-store job record
//! and its status enums, resource descriptors, and the commands and
//! answers exchanged with transfer agents. All entities derive `Debug`,
//! `Clone`, `Serialize` and `Deserialize`.

pub mod command;
pub mod record;
pub mod resource;

pub use command::{
    AgentCommand, Credentials, DownloadAnswer, DownloadCommand, ProgressCommand, Proxy, RequestType,
};
pub use record::{DownloadStatus, JobIdentity, JobRecord, ObjectState, ResourceKind, StoreRole};
pub use resource::{
    ImageFormat, RegisterVolumePayload, ResourceDescriptor, StoreRef, TemplateResource,
    VolumeResource,
};
