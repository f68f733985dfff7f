use super::filters::{screenshot_timestamps, GifFilter};
use super::toolchain::VideoToolchain;
use crate::error::{ProcessingError, Stage};
use crate::settings::DerivativeSettings;
use recipebox_core::{naming, DerivativeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;

/// Removes the transient palette when the GIF stage finishes, whatever the outcome.
struct PaletteGuard<'a> {
    path: &'a Path,
}

impl Drop for PaletteGuard<'_> {
    fn drop(&mut self) {
        match std::fs::remove_file(self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove palette");
            }
        }
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Cleanup failed");
        }
    }
}

/// Paths for one video's derivatives
struct Layout<'a> {
    dir: &'a Path,
    base: &'a str,
}

impl<'a> Layout<'a> {
    fn for_input(input: &'a Path) -> Result<Self, ProcessingError> {
        let invalid = || ProcessingError::InvalidPath(input.display().to_string());
        let dir = input.parent().ok_or_else(invalid)?;
        let filename = input.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        Ok(Self {
            dir,
            base: naming::base_name(filename),
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Four-stage video pipeline: probe, screenshots, palette, GIF.
///
/// Probe and screenshot failures are fatal. Palette and GIF failures are logged and
/// reported as a `DerivativeSet` without a GIF.
pub struct VideoDerivativeGenerator {
    toolchain: Arc<dyn VideoToolchain>,
    settings: DerivativeSettings,
}

impl VideoDerivativeGenerator {
    pub fn new(toolchain: Arc<dyn VideoToolchain>, settings: DerivativeSettings) -> Self {
        Self {
            toolchain,
            settings,
        }
    }

    #[tracing::instrument(skip(self), fields(media_type = "video"))]
    pub async fn generate(&self, input: &Path) -> Result<DerivativeSet, ProcessingError> {
        let start = Instant::now();
        let layout = Layout::for_input(input)?;

        let duration = self.probe(input).await?;
        let screenshots = self.extract_screenshots(input, &layout, duration).await?;

        let gif = match self.render_animation(input, &layout, duration).await {
            Ok(name) => Some(name),
            Err(err) => {
                tracing::warn!(error = %err, "Animated preview skipped");
                None
            }
        };

        tracing::info!(
            screenshots = screenshots.len(),
            has_gif = gif.is_some(),
            duration_seconds = duration,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video derivatives generated"
        );

        Ok(DerivativeSet::Video { screenshots, gif })
    }

    /// Stage 1. Returns the duration to use downstream, after the fallback.
    async fn probe(&self, input: &Path) -> Result<f64, ProcessingError> {
        let probed = self
            .toolchain
            .probe_duration(input)
            .await
            .map_err(|e| ProcessingError::at_stage(Stage::Probe, format!("{:#}", e)))?;

        let duration = self.settings.effective_duration(probed);
        if probed != Some(duration) {
            tracing::debug!(
                probed = ?probed,
                fallback = duration,
                "Probe reported no usable duration, using fallback"
            );
        }
        Ok(duration)
    }

    /// Stage 2. All screenshots or none: on failure, frames already written are removed.
    async fn extract_screenshots(
        &self,
        input: &Path,
        layout: &Layout<'_>,
        duration: f64,
    ) -> Result<Vec<String>, ProcessingError> {
        let timestamps = screenshot_timestamps(duration, self.settings.screenshot_count);
        let mut written = Vec::with_capacity(timestamps.len());

        for (i, at_seconds) in timestamps.into_iter().enumerate() {
            let name = naming::video_screenshot(layout.base, i + 1);
            match self.extract_one(input, layout, &name, at_seconds).await {
                Ok(()) => written.push(name),
                Err(e) => {
                    for done in &written {
                        remove_quietly(&layout.path(done)).await;
                    }
                    return Err(ProcessingError::at_stage(
                        Stage::Screenshots,
                        format!("{}: {:#}", name, e),
                    ));
                }
            }
        }

        Ok(written)
    }

    /// One frame, written through a `.part` file. A seek past the real end of the
    /// stream (possible when the duration came from the fallback) retries at 0s.
    async fn extract_one(
        &self,
        input: &Path,
        layout: &Layout<'_>,
        name: &str,
        at_seconds: f64,
    ) -> anyhow::Result<()> {
        let output = layout.path(name);
        let partial = layout.path(&naming::partial(name));
        let width = self.settings.thumbnail_max_dimension;

        let mut attempt = self
            .frame_to(input, at_seconds, width, &partial)
            .await;
        if attempt.is_err() && at_seconds > 0.0 {
            tracing::debug!(screenshot = %name, at_seconds, "Retrying screenshot from start");
            attempt = self.frame_to(input, 0.0, width, &partial).await;
        }

        if let Err(e) = attempt {
            remove_quietly(&partial).await;
            return Err(e);
        }

        fs::rename(&partial, &output).await?;
        Ok(())
    }

    async fn frame_to(
        &self,
        input: &Path,
        at_seconds: f64,
        width: u32,
        output: &Path,
    ) -> anyhow::Result<()> {
        self.toolchain
            .extract_frame(input, at_seconds, width, output)
            .await?;
        if !fs::try_exists(output).await.unwrap_or(false) {
            anyhow::bail!("no frame decoded at {:.3}s", at_seconds);
        }
        Ok(())
    }

    /// Stages 3 and 4. Any error here is `DerivativeDegraded`.
    async fn render_animation(
        &self,
        input: &Path,
        layout: &Layout<'_>,
        duration: f64,
    ) -> Result<String, ProcessingError> {
        let filter = GifFilter::for_duration(duration, &self.settings);
        let palette = layout.path(&naming::palette(layout.base));
        let _palette_guard = PaletteGuard { path: &palette };

        tracing::debug!(speed_factor = filter.speed_factor, "Generating palette");
        self.toolchain
            .generate_palette(input, &filter, &palette)
            .await
            .and_then(|()| {
                if palette.exists() {
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("palette was not written"))
                }
            })
            .map_err(|e| ProcessingError::at_stage(Stage::Palette, format!("{:#}", e)))?;

        let name = naming::animation(layout.base);
        let partial = layout.path(&naming::partial(&name));

        let encoded = self
            .toolchain
            .encode_gif(input, &palette, &filter, &partial)
            .await;
        let encoded = match encoded {
            Ok(()) => fs::rename(&partial, layout.path(&name))
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };

        if let Err(e) = encoded {
            remove_quietly(&partial).await;
            return Err(ProcessingError::at_stage(Stage::Gif, format!("{:#}", e)));
        }

        Ok(name)
    }
}
