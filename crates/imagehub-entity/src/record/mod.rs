//! Per-store transfer job records.

pub mod identity;
pub mod model;
pub mod status;

pub use identity::{JobIdentity, ResourceKind, StoreRole};
pub use model::JobRecord;
pub use status::{DownloadStatus, ObjectState};
