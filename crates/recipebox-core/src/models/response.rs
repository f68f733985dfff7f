use super::media::{DerivativeSet, UploadedAsset};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of a successful upload (HTTP 201)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Stored filename, relative to its storage root
    #[schema(example = "3f2a9c0e4b7d41a6a1e5c2d8f0b9e7a1_42.png")]
    pub filename: String,
    /// Normalized MIME type declared by the client
    #[schema(example = "image/png")]
    pub media_type: String,
    /// Size in bytes
    pub filesize: u64,
    pub derivatives: DerivativeSet,
}

impl UploadResponse {
    pub fn new(asset: &UploadedAsset, derivatives: DerivativeSet) -> Self {
        Self {
            filename: asset.filename.clone(),
            media_type: asset.media_type.clone(),
            filesize: asset.filesize,
            derivatives,
        }
    }
}

/// Body of a successful cascade delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub filename: String,
    /// Number of files unlinked, the original included
    pub removed: usize,
}
