use crate::error::{StorageError, StorageResult};
use recipebox_core::{naming, StorageArea};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Outcome of a cascade delete
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// Names that were unlinked, in directory order
    pub removed: Vec<String>,
    /// Names that matched but could not be unlinked
    pub failed: Vec<String>,
}

/// Local filesystem storage for one storage area
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    area: StorageArea,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating `base_path` if needed
    ///
    /// # Arguments
    /// * `base_path` - Root directory for this area (e.g., "uploads")
    /// * `area` - Which storage area the directory backs
    pub async fn new(base_path: impl Into<PathBuf>, area: StorageArea) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path, area })
    }

    pub fn area(&self) -> StorageArea {
        self.area
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a stored filename to its path inside the area root.
    ///
    /// Only single path components are accepted, so the result can never leave the root.
    pub fn path_for(&self, filename: &str) -> StorageResult<PathBuf> {
        if !naming::is_plain_filename(filename) {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is not a plain file name",
                filename
            )));
        }
        Ok(self.base_path.join(filename))
    }

    pub async fn exists(&self, filename: &str) -> StorageResult<bool> {
        let path = self.path_for(filename)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Persist upload bytes under `filename`. Refuses to overwrite an existing file.
    #[tracing::instrument(skip(self, data), fields(area = %self.area, size_bytes = data.len()))]
    pub async fn store(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path_for(filename)?;
        let start = Instant::now();

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists(filename.to_string()),
                _ => StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                )),
            })?;

        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partially written upload"
                );
            }
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            filename = %filename,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(path)
    }

    /// Remove one file, ignoring a file that is already gone.
    pub async fn remove(&self, filename: &str) -> StorageResult<()> {
        let path = self.path_for(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Delete `filename` and every file in the area root whose name contains its base name.
    ///
    /// Fails with `NotFound` before touching the directory if `filename` itself is missing.
    /// Each match is unlinked on its own; a match that cannot be removed is logged and
    /// skipped. The call only fails afterwards if `filename` itself could not be removed.
    #[tracing::instrument(skip(self), fields(area = %self.area))]
    pub async fn delete_cascade(&self, filename: &str) -> StorageResult<CascadeReport> {
        let target = self.path_for(filename)?;
        if naming::extension_of(filename).is_none() {
            return Err(StorageError::InvalidKey(format!(
                "'{}' has no extension",
                filename
            )));
        }

        if !fs::try_exists(&target).await.unwrap_or(false) {
            return Err(StorageError::NotFound(filename.to_string()));
        }

        let base = naming::base_name(filename);
        let start = Instant::now();

        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to scan {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut report = CascadeReport::default();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Directory scan interrupted");
                    break;
                }
            };

            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.contains(base) {
                continue;
            }
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {}
                _ => continue,
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::debug!(file = %name, "Removed file");
                    report.removed.push(name);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Failed to remove file");
                    report.failed.push(name);
                }
            }
        }

        if report.failed.iter().any(|name| name == filename) {
            return Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}",
                filename
            )));
        }

        tracing::info!(
            filename = %filename,
            removed = report.removed.len(),
            failed = report.failed.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cascade delete complete"
        );

        Ok(report)
    }

    /// True when the root exists, is a directory and is not read-only.
    pub async fn is_writable(&self) -> bool {
        match fs::metadata(&self.base_path).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }
}
