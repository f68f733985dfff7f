use recipebox_core::{naming, MediaCategory};

/// Common validation errors for uploaded files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Missing file extension: {0}")]
    MissingExtension(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Normalize a MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Validator for one media category
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Returns the lowercased extension on success.
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = naming::extension_of(filename)
            .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_mime_type(content_type);

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct.to_lowercase() == normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate that Content-Type matches the file extension, so a video cannot be
    /// routed to the image decoder by lying about its type (and vice versa).
    pub fn validate_extension_content_type_match(
        &self,
        extension: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let normalized = normalize_mime_type(content_type);

        let expected_content_types: &[&str] = match extension {
            "jpg" | "jpeg" => &["image/jpeg"],
            "png" => &["image/png"],
            "gif" => &["image/gif"],
            "webp" => &["image/webp"],
            "mp4" => &["video/mp4"],
            "m4v" => &["video/x-m4v", "video/mp4"],
            "mov" => &["video/quicktime"],
            "webm" => &["video/webm"],
            "mkv" => &["video/x-matroska"],
            "avi" => &["video/x-msvideo", "video/avi"],
            _ => {
                tracing::debug!(
                    extension = %extension,
                    content_type = %content_type,
                    "Unknown extension, skipping Content-Type/extension cross-validation"
                );
                return Ok(());
            }
        };

        if !expected_content_types.iter().any(|ct| *ct == normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: format!(
                    "{} (does not match extension '{}'. Expected one of: {})",
                    content_type,
                    extension,
                    expected_content_types.join(", ")
                ),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate all aspects of a file; returns the lowercased extension.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<String, ValidationError> {
        let extension = self.validate_extension(filename)?;
        self.validate_file_size(file_size)?;
        self.validate_content_type(content_type)?;
        self.validate_extension_content_type_match(&extension, content_type)?;
        Ok(extension)
    }
}

/// Routes an upload to the image or video rules based on its declared content type
#[derive(Debug, Clone)]
pub struct UploadValidator {
    image: MediaValidator,
    video: MediaValidator,
}

/// A validated upload's routing facts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub category: MediaCategory,
    pub extension: String,
    pub content_type: String,
}

impl UploadValidator {
    pub fn new(image: MediaValidator, video: MediaValidator) -> Self {
        Self { image, video }
    }

    pub fn validate(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<ValidatedUpload, ValidationError> {
        if naming::extension_of(filename).is_none() {
            return Err(ValidationError::MissingExtension(filename.to_string()));
        }

        let category = MediaCategory::from_mime(content_type)
            .ok_or_else(|| ValidationError::UnsupportedMediaType(content_type.to_string()))?;

        let validator = match category {
            MediaCategory::Image => &self.image,
            MediaCategory::Video => &self.video,
        };
        let extension = validator.validate_all(filename, content_type, file_size)?;

        Ok(ValidatedUpload {
            category,
            extension,
            content_type: normalize_mime_type(content_type),
        })
    }
}
