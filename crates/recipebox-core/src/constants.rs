//! Fixed parameters of the derivative pipeline.

/// Bounding box edge for image thumbnails; also the width of video screenshots and GIF frames.
pub const THUMBNAIL_MAX_DIMENSION: u32 = 320;

/// Number of still frames extracted from every video.
pub const SCREENSHOT_COUNT: usize = 3;

pub const PALETTE_MAX_COLORS: u32 = 32;

pub const GIF_FRAME_RATE: u32 = 10;

/// The animated preview plays back in roughly this many seconds regardless of source length.
pub const GIF_TARGET_SECONDS: f64 = 5.0;

/// Substituted when the probe reports a missing or non-positive duration.
pub const FALLBACK_DURATION_SECONDS: f64 = 10.0;

/// Mid-range on ffmpeg's 0-10 scale.
pub const GIF_COMPRESSION_LEVEL: u8 = 5;

/// Appended to derivative names while they are being written.
pub const PARTIAL_SUFFIX: &str = ".part";
