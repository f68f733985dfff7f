//! Recipebox Processing Library
//!
//! Upload validation and derivative generation. Images get a single bounded PNG
//! thumbnail; videos run a four-stage ffprobe/ffmpeg pipeline producing screenshots
//! and an optional palette-quantized GIF preview.

pub mod error;
pub mod image;
pub mod pipeline;
pub mod settings;
pub mod validator;
pub mod video;

// Re-export commonly used types
pub use error::{ProcessingError, Stage};
pub use self::image::ImageThumbnailer;
pub use pipeline::DerivativePipeline;
pub use settings::DerivativeSettings;
pub use validator::{MediaValidator, UploadValidator, ValidatedUpload, ValidationError};
pub use video::{FfmpegToolchain, GifFilter, VideoDerivativeGenerator, VideoToolchain};
