use crate::error::ProcessingError;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat, ImageReader};
use recipebox_core::{naming, DerivativeSet};
use std::io::Cursor;
use std::path::Path;
use tokio::fs;

/// Largest size that fits inside a `max` x `max` box with the same aspect ratio.
///
/// Images already inside the box are left at their original size.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = max as f64 / width.max(height) as f64;
    let fit = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max);
    (fit(width), fit(height))
}

/// Select a resampling filter based on the downscale ratio
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Decode, fit and re-encode as PNG. CPU bound; run on the blocking pool.
fn render_thumbnail(data: &[u8], max_dimension: u32) -> Result<Vec<u8>, ProcessingError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::Thumbnail(format!("Failed to detect image format: {}", e)))?
        .decode()
        .map_err(|e| ProcessingError::Thumbnail(format!("Failed to decode image: {}", e)))?;

    let (width, height) = img.dimensions();
    let (target_width, target_height) = fit_within(width, height, max_dimension);

    let thumbnail = if (target_width, target_height) == (width, height) {
        img
    } else {
        let filter = select_filter(width, height, target_width, target_height);
        img.resize_exact(target_width, target_height, filter)
    };

    let mut encoded = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|e| ProcessingError::Thumbnail(format!("Failed to encode PNG: {}", e)))?;

    Ok(encoded.into_inner())
}

/// Writes `<base>-thumb.png` next to an uploaded image
#[derive(Debug, Clone)]
pub struct ImageThumbnailer {
    max_dimension: u32,
}

impl ImageThumbnailer {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Generate the thumbnail for the image at `input`.
    ///
    /// The PNG is written to a `.part` sibling and renamed into place, so a failure
    /// never leaves a truncated thumbnail behind.
    #[tracing::instrument(skip(self), fields(stage = "thumbnail"))]
    pub async fn generate(&self, input: &Path) -> Result<DerivativeSet, ProcessingError> {
        let start = std::time::Instant::now();

        let dir = input
            .parent()
            .ok_or_else(|| ProcessingError::InvalidPath(input.display().to_string()))?;
        let filename = input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ProcessingError::InvalidPath(input.display().to_string()))?;

        let name = naming::image_thumbnail(naming::base_name(filename));
        let output = dir.join(&name);
        let partial = dir.join(naming::partial(&name));

        let data = fs::read(input).await.map_err(|e| {
            ProcessingError::Thumbnail(format!("Failed to read {}: {}", input.display(), e))
        })?;

        let max_dimension = self.max_dimension;
        let png = tokio::task::spawn_blocking(move || render_thumbnail(&data, max_dimension))
            .await
            .map_err(|e| ProcessingError::Thumbnail(format!("Thumbnail task failed: {}", e)))??;

        let written = async {
            fs::write(&partial, &png).await?;
            fs::rename(&partial, &output).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                tracing::debug!(error = %cleanup, "No partial thumbnail to remove");
            }
            return Err(ProcessingError::Thumbnail(format!(
                "Failed to write {}: {}",
                output.display(),
                e
            )));
        }

        tracing::info!(
            thumbnail = %name,
            size_bytes = png.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image thumbnail generated"
        );

        Ok(DerivativeSet::Image { thumbnail: name })
    }
}
