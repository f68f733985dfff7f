//! Application state shared by every handler

use crate::auth::JwtService;
use crate::middleware::HttpRateLimiter;
use recipebox_core::{Config, StorageArea};
use recipebox_processing::{DerivativePipeline, UploadValidator};
use recipebox_storage::LocalStorage;
use std::sync::Arc;

/// The two independent storage roots
#[derive(Clone)]
pub struct StorageState {
    pub uploads: LocalStorage,
    pub profile_pictures: LocalStorage,
}

impl StorageState {
    pub fn area(&self, area: StorageArea) -> &LocalStorage {
        match area {
            StorageArea::Uploads => &self.uploads,
            StorageArea::ProfilePictures => &self.profile_pictures,
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub storage: StorageState,
    pub validator: UploadValidator,
    pub pipeline: DerivativePipeline,
    pub jwt: Arc<JwtService>,
    pub rate_limiter: Arc<HttpRateLimiter>,
}
