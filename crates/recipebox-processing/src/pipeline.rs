use crate::error::ProcessingError;
use crate::image::ImageThumbnailer;
use crate::settings::DerivativeSettings;
use crate::video::{VideoDerivativeGenerator, VideoToolchain};
use recipebox_core::{DerivativeSet, MediaCategory};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Routes a stored upload to its derivative generator under an overall deadline.
///
/// When the deadline passes, the in-flight generator future is dropped; any running
/// ffmpeg child is killed with it.
pub struct DerivativePipeline {
    images: ImageThumbnailer,
    videos: VideoDerivativeGenerator,
    timeout: Duration,
}

impl DerivativePipeline {
    pub fn new(
        settings: DerivativeSettings,
        toolchain: Arc<dyn VideoToolchain>,
        timeout: Duration,
    ) -> Self {
        Self {
            images: ImageThumbnailer::new(settings.thumbnail_max_dimension),
            videos: VideoDerivativeGenerator::new(toolchain, settings),
            timeout,
        }
    }

    pub async fn process(
        &self,
        path: &Path,
        category: MediaCategory,
    ) -> Result<DerivativeSet, ProcessingError> {
        let work = async {
            match category {
                MediaCategory::Image => self.images.generate(path).await,
                MediaCategory::Video => self.videos.generate(path).await,
            }
        };

        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    path = %path.display(),
                    category = %category,
                    timeout_secs = self.timeout.as_secs(),
                    "Derivative generation timed out"
                );
                Err(ProcessingError::Timeout(self.timeout))
            }
        }
    }
}
