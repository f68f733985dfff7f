//! Video derivatives
//!
//! `VideoToolchain` is the seam between the pipeline policy (what runs, in what
//! order, which failures are fatal) and the external processes that do the work.

mod command;
pub mod filters;
pub mod generator;
pub mod probe;
pub mod toolchain;

pub use filters::{screenshot_timestamps, GifFilter};
pub use generator::VideoDerivativeGenerator;
pub use toolchain::{FfmpegToolchain, VideoToolchain};
