//! Shared value types used across ImageHub crates.

pub mod id;

pub use id::{ResourceId, StoreId};
