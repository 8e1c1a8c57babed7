//! # imagehub-core
//!
//! Core crate for ImageHub. Contains configuration schemas and the raw
//! key/value configuration provider, typed identifiers, logging setup,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other ImageHub crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
