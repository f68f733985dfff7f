/// Errors from a local storage root
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Writing the uploaded bytes failed
    #[error("Failed to store file: {0}")]
    UploadFailed(String),

    /// Scanning the root or removing the original failed
    #[error("Failed to delete file: {0}")]
    DeleteFailed(String),

    #[error("No such file in storage: {0}")]
    NotFound(String),

    /// A stored name is never reused
    #[error("Stored filename already taken: {0}")]
    AlreadyExists(String),

    /// Name with separators, `..`, or no extension
    #[error("Invalid stored filename: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage root missing, not a directory, or not creatable
    #[error("Storage root unusable: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
