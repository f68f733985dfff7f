//! Domain models

pub mod media;
pub mod response;

pub use media::{DerivativeSet, MediaCategory, StorageArea, UploadedAsset};
pub use response::{DeleteResponse, UploadResponse};
