use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

/// Steps of derivative generation, in execution order for videos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Thumbnail,
    Probe,
    Screenshots,
    Palette,
    Gif,
}

impl Stage {
    /// Whether a failure in this stage fails the upload.
    ///
    /// Palette and GIF failures only cost the animated preview.
    pub fn is_fatal(self) -> bool {
        matches!(self, Stage::Thumbnail | Stage::Probe | Stage::Screenshots)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Thumbnail => "thumbnail",
            Stage::Probe => "probe",
            Stage::Screenshots => "screenshots",
            Stage::Palette => "palette",
            Stage::Gif => "gif",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Derivative generation errors
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Screenshot extraction failed: {0}")]
    Screenshot(String),

    #[error("Thumbnail generation failed: {0}")]
    Thumbnail(String),

    /// Palette or GIF stage failed. Logged and swallowed by the video generator.
    #[error("{stage} stage degraded: {reason}")]
    DerivativeDegraded { stage: Stage, reason: String },

    #[error("Derivative generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Invalid input path: {0}")]
    InvalidPath(String),
}

impl ProcessingError {
    /// Classify a failed stage as fatal or degraded.
    pub fn at_stage(stage: Stage, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match stage {
            Stage::Probe => ProcessingError::Probe(reason),
            Stage::Screenshots => ProcessingError::Screenshot(reason),
            Stage::Thumbnail => ProcessingError::Thumbnail(reason),
            Stage::Palette | Stage::Gif => ProcessingError::DerivativeDegraded { stage, reason },
        }
    }

    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProcessingError::DerivativeDegraded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        assert!(ProcessingError::at_stage(Stage::Probe, "x").is_fatal());
        assert!(ProcessingError::at_stage(Stage::Screenshots, "x").is_fatal());
        assert!(ProcessingError::at_stage(Stage::Thumbnail, "x").is_fatal());
        assert!(!ProcessingError::at_stage(Stage::Palette, "x").is_fatal());
        assert!(!ProcessingError::at_stage(Stage::Gif, "x").is_fatal());
        for stage in [Stage::Palette, Stage::Gif] {
            assert!(!stage.is_fatal());
        }
    }

    #[test]
    fn test_degraded_message_names_stage() {
        let err = ProcessingError::at_stage(Stage::Palette, "exit status 1");
        assert_eq!(err.to_string(), "palette stage degraded: exit status 1");
    }
}
