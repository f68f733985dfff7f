//! Upload and delete workflows
//!
//! Upload: validate → name → store → generate derivatives. A fatal derivative failure,
//! a pipeline timeout or a dropped request removes the stored original and everything
//! derived from it, so a failed upload leaves nothing on disk.
//!
//! Delete: authorize from the filename alone, then cascade by base name.

use crate::auth::UserContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::MultipartFile;
use recipebox_core::{
    naming, AppError, DeleteResponse, StorageArea, UploadResponse, UploadedAsset,
};
use recipebox_storage::LocalStorage;
use std::time::Instant;

/// Cascade-deletes a stored upload unless disarmed.
///
/// Covers cancellation: if the request future is dropped mid-pipeline, `Drop` schedules
/// the cleanup on the runtime.
struct StoredUploadGuard {
    storage: LocalStorage,
    filename: Option<String>,
}

impl StoredUploadGuard {
    fn new(storage: &LocalStorage, filename: &str) -> Self {
        Self {
            storage: storage.clone(),
            filename: Some(filename.to_string()),
        }
    }

    fn disarm(mut self) {
        self.filename = None;
    }

    /// Remove the upload now and wait for it.
    async fn cleanup(mut self) {
        if let Some(filename) = self.filename.take() {
            remove_upload(&self.storage, &filename).await;
        }
    }
}

impl Drop for StoredUploadGuard {
    fn drop(&mut self) {
        let Some(filename) = self.filename.take() else {
            return;
        };
        let storage = self.storage.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(filename = %filename, "Upload abandoned, scheduling cleanup");
                handle.spawn(async move { remove_upload(&storage, &filename).await });
            }
            Err(_) => {
                tracing::error!(filename = %filename, "No runtime to clean up abandoned upload");
            }
        }
    }
}

async fn remove_upload(storage: &LocalStorage, filename: &str) {
    match storage.delete_cascade(filename).await {
        Ok(report) => {
            tracing::info!(
                filename = %filename,
                removed = report.removed.len(),
                failed = report.failed.len(),
                "Removed failed upload"
            );
        }
        Err(e) => {
            tracing::warn!(filename = %filename, error = %e, "Failed to remove failed upload");
        }
    }
}

/// Upload and delete operations for one storage area
pub struct MediaUploadService<'a> {
    state: &'a AppState,
    area: StorageArea,
}

impl<'a> MediaUploadService<'a> {
    pub fn new(state: &'a AppState, area: StorageArea) -> Self {
        Self { state, area }
    }

    fn storage(&self) -> &LocalStorage {
        self.state.storage.area(self.area)
    }

    /// Complete upload workflow; returns the 201 body.
    #[tracing::instrument(
        skip(self, user, file),
        fields(
            area = %self.area,
            owner_id = %user.user_id,
            client_filename = %file.filename,
            size_bytes = file.data.len()
        )
    )]
    pub async fn upload(
        &self,
        user: &UserContext,
        file: MultipartFile,
    ) -> Result<UploadResponse, HttpAppError> {
        let start = Instant::now();

        // 1. Validate against the rules of the category implied by the content type
        let validated =
            self.state
                .validator
                .validate(&file.filename, &file.content_type, file.data.len())?;

        if !self.area.accepts(validated.category) {
            return Err(AppError::InvalidInput(format!(
                "{} uploads are not accepted for {}",
                validated.category, self.area
            ))
            .into());
        }

        // 2. Name it after the owner
        let filename = naming::stored_filename(&user.user_id, &validated.extension)
            .ok_or_else(|| {
                AppError::InvalidInput("Missing or invalid user identity".to_string())
            })?;

        // 3. Persist the original
        let path = self.storage().store(&filename, &file.data).await?;
        let guard = StoredUploadGuard::new(self.storage(), &filename);

        let asset = UploadedAsset {
            filename,
            path,
            area: self.area,
            owner_id: user.user_id.clone(),
            media_type: validated.content_type,
            category: validated.category,
            filesize: file.data.len() as u64,
        };
        drop(file);

        // 4. Derivatives
        let derivatives = match self
            .state
            .pipeline
            .process(&asset.path, asset.category)
            .await
        {
            Ok(derivatives) => {
                guard.disarm();
                derivatives
            }
            Err(e) => {
                tracing::error!(
                    filename = %asset.filename,
                    category = %asset.category,
                    error = %e,
                    "Derivative generation failed"
                );
                guard.cleanup().await;
                return Err(e.into());
            }
        };

        tracing::info!(
            filename = %asset.filename,
            category = %asset.category,
            media_type = %asset.media_type,
            derivatives = derivatives.files().len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        Ok(UploadResponse::new(&asset, derivatives))
    }

    /// Delete a stored upload and every file derived from it.
    ///
    /// Only the owner named in the filename, or an admin, may delete. Authorization is
    /// decided before the filesystem is touched.
    #[tracing::instrument(skip(self, user), fields(area = %self.area, requester = %user.user_id))]
    pub async fn delete(
        &self,
        user: &UserContext,
        filename: &str,
    ) -> Result<DeleteResponse, HttpAppError> {
        if !naming::is_plain_filename(filename) || naming::extension_of(filename).is_none() {
            return Err(AppError::InvalidInput(format!(
                "'{}' is not a valid file name",
                filename
            ))
            .into());
        }

        let owner = naming::owner_of(filename).ok_or_else(|| {
            AppError::InvalidInput(format!("'{}' is not a stored upload name", filename))
        })?;

        if owner != user.user_id && !user.is_admin() {
            tracing::warn!(
                filename = %filename,
                owner_id = %owner,
                "Delete refused: requester is neither owner nor admin"
            );
            return Err(AppError::Unauthorized(
                "Only the owner or an administrator can delete this file".to_string(),
            )
            .into());
        }

        let report = self.storage().delete_cascade(filename).await?;
        if !report.failed.is_empty() {
            tracing::warn!(
                filename = %filename,
                failed = ?report.failed,
                "Some derivatives could not be removed"
            );
        }

        tracing::info!(
            filename = %filename,
            removed = report.removed.len(),
            admin_override = owner != user.user_id,
            "Upload deleted"
        );

        Ok(DeleteResponse {
            filename: filename.to_string(),
            removed: report.removed.len(),
        })
    }
}
