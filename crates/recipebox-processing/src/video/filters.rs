//! ffmpeg filter graphs for the animated preview

use crate::settings::DerivativeSettings;

/// Re-time, resample and scale chain shared by palette generation and GIF encoding
#[derive(Debug, Clone, PartialEq)]
pub struct GifFilter {
    /// Playback speed-up; `duration / target_seconds`, never non-positive
    pub speed_factor: f64,
    pub frame_rate: u32,
    pub width: u32,
    pub max_colors: u32,
    pub compression_level: u8,
}

impl GifFilter {
    pub fn for_duration(duration_seconds: f64, settings: &DerivativeSettings) -> Self {
        let speed_factor = duration_seconds / settings.gif_target_seconds;
        let speed_factor = if speed_factor.is_finite() && speed_factor > 0.0 {
            speed_factor
        } else {
            1.0
        };

        Self {
            speed_factor,
            frame_rate: settings.gif_frame_rate,
            width: settings.thumbnail_max_dimension,
            max_colors: settings.palette_max_colors,
            compression_level: settings.gif_compression_level,
        }
    }

    /// `setpts=PTS/<speed>,fps=<fps>,scale=<width>:-1:flags=lanczos`
    pub fn chain(&self) -> String {
        format!(
            "setpts=PTS/{},fps={},scale={}:-1:flags=lanczos",
            self.speed_factor, self.frame_rate, self.width
        )
    }

    /// Filter for the first pass, producing the palette image.
    pub fn palettegen(&self) -> String {
        format!("{},palettegen=max_colors={}", self.chain(), self.max_colors)
    }

    /// Filter graph for the second pass; input 1 is the palette.
    pub fn paletteuse(&self) -> String {
        format!("{}[x];[x][1:v]paletteuse", self.chain())
    }
}

/// Evenly spaced seek points strictly inside `(0, duration)`.
pub fn screenshot_timestamps(duration_seconds: f64, count: usize) -> Vec<f64> {
    let slots = (count + 1) as f64;
    (1..=count)
        .map(|i| duration_seconds * i as f64 / slots)
        .collect()
}
