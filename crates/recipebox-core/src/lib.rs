//! Recipebox Core Library
//!
//! This crate provides configuration, error types, domain models and the upload
//! filename convention shared by the storage, processing and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod naming;

// Re-export commonly used types
pub use config::{BaseConfig, Config, MediaConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    DeleteResponse, DerivativeSet, MediaCategory, StorageArea, UploadResponse, UploadedAsset,
};
