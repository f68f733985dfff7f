use recipebox_core::constants::{
    FALLBACK_DURATION_SECONDS, GIF_COMPRESSION_LEVEL, GIF_FRAME_RATE, GIF_TARGET_SECONDS,
    PALETTE_MAX_COLORS, SCREENSHOT_COUNT, THUMBNAIL_MAX_DIMENSION,
};

/// Parameters of the derivative pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeSettings {
    /// Bounding box edge for image thumbnails, width for screenshots and GIF frames
    pub thumbnail_max_dimension: u32,
    pub screenshot_count: usize,
    pub palette_max_colors: u32,
    pub gif_frame_rate: u32,
    pub gif_target_seconds: f64,
    pub fallback_duration_seconds: f64,
    pub gif_compression_level: u8,
}

impl Default for DerivativeSettings {
    fn default() -> Self {
        Self {
            thumbnail_max_dimension: THUMBNAIL_MAX_DIMENSION,
            screenshot_count: SCREENSHOT_COUNT,
            palette_max_colors: PALETTE_MAX_COLORS,
            gif_frame_rate: GIF_FRAME_RATE,
            gif_target_seconds: GIF_TARGET_SECONDS,
            fallback_duration_seconds: FALLBACK_DURATION_SECONDS,
            gif_compression_level: GIF_COMPRESSION_LEVEL,
        }
    }
}

impl DerivativeSettings {
    /// Duration used downstream of the probe; missing or non-positive values fall back.
    pub fn effective_duration(&self, probed: Option<f64>) -> f64 {
        match probed {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => self.fallback_duration_seconds,
        }
    }
}
