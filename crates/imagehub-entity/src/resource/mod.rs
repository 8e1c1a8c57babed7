//! Descriptors of the templates and volumes handed to the transfer layer.

pub mod format;
pub mod model;

pub use format::{ImageFormat, UnknownImageFormat};
pub use model::{
    RegisterVolumePayload, ResourceDescriptor, StoreRef, TemplateResource, VolumeResource,
};
