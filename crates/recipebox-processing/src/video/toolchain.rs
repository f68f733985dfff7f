use super::command::{self, validate_executable};
use super::filters::GifFilter;
use super::probe::parse_duration;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

/// External probing/transcoding operations used by the video pipeline.
///
/// Implementations write exactly the output path they are given and nothing else.
#[async_trait]
pub trait VideoToolchain: Send + Sync {
    /// Container duration in seconds; `None` when the container doesn't report one.
    async fn probe_duration(&self, input: &Path) -> Result<Option<f64>>;

    /// Extract a single PNG frame at `at_seconds`, scaled to `width`.
    async fn extract_frame(
        &self,
        input: &Path,
        at_seconds: f64,
        width: u32,
        output: &Path,
    ) -> Result<()>;

    /// First pass of the GIF encode: write the palette PNG.
    async fn generate_palette(&self, input: &Path, filter: &GifFilter, output: &Path)
        -> Result<()>;

    /// Second pass: encode the animated GIF using `palette`.
    async fn encode_gif(
        &self,
        input: &Path,
        palette: &Path,
        filter: &GifFilter,
        output: &Path,
    ) -> Result<()>;
}

/// ffprobe + ffmpeg subprocess implementation
#[derive(Debug, Clone)]
pub struct FfmpegToolchain {
    ffmpeg_path: String,
    ffprobe_path: String,
    stage_timeout: Duration,
}

impl FfmpegToolchain {
    pub fn new(ffmpeg_path: String, ffprobe_path: String, stage_timeout: Duration) -> Result<Self> {
        validate_executable(&ffmpeg_path).context("Invalid ffmpeg_path")?;
        validate_executable(&ffprobe_path).context("Invalid ffprobe_path")?;

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
            stage_timeout,
        })
    }

    async fn ffmpeg(&self, args: Vec<OsString>, operation: &'static str) -> Result<()> {
        command::run(&self.ffmpeg_path, args, self.stage_timeout, operation).await?;
        Ok(())
    }
}

/// Arguments every ffmpeg invocation starts with
fn ffmpeg_base_args() -> Vec<OsString> {
    ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

/// ffprobe: JSON format and first video stream. `-v error` keeps demuxer failures on stderr.
pub(crate) fn probe_args(input: &Path) -> Vec<OsString> {
    vec![
        "-v".into(),
        "error".into(),
        "-print_format".into(),
        "json".into(),
        "-show_format".into(),
        "-show_streams".into(),
        "-select_streams".into(),
        "v:0".into(),
        input.as_os_str().to_owned(),
    ]
}

/// Single PNG frame at `at_seconds`, scaled to `width`; explicit muxer so `.part` outputs work.
pub(crate) fn frame_args(input: &Path, at_seconds: f64, width: u32, output: &Path) -> Vec<OsString> {
    let mut args = ffmpeg_base_args();
    args.extend([
        "-ss".into(),
        format!("{:.3}", at_seconds).into(),
        "-i".into(),
        input.as_os_str().to_owned(),
        "-frames:v".into(),
        "1".into(),
        "-vf".into(),
        format!("scale={}:-1", width).into(),
        "-c:v".into(),
        "png".into(),
        "-f".into(),
        "image2".into(),
        "-update".into(),
        "1".into(),
        output.as_os_str().to_owned(),
    ]);
    args
}

pub(crate) fn palette_args(input: &Path, filter: &GifFilter, output: &Path) -> Vec<OsString> {
    let mut args = ffmpeg_base_args();
    args.extend([
        "-i".into(),
        input.as_os_str().to_owned(),
        "-vf".into(),
        filter.palettegen().into(),
        "-c:v".into(),
        "png".into(),
        "-f".into(),
        "image2".into(),
        "-update".into(),
        "1".into(),
        output.as_os_str().to_owned(),
    ]);
    args
}

/// Second pass: the palette is input 1, referenced as `[1:v]` in the graph.
pub(crate) fn gif_args(
    input: &Path,
    palette: &Path,
    filter: &GifFilter,
    output: &Path,
) -> Vec<OsString> {
    let mut args = ffmpeg_base_args();
    args.extend([
        "-i".into(),
        input.as_os_str().to_owned(),
        "-i".into(),
        palette.as_os_str().to_owned(),
        "-lavfi".into(),
        filter.paletteuse().into(),
        "-loop".into(),
        "0".into(),
        "-compression_level".into(),
        filter.compression_level.to_string().into(),
        "-f".into(),
        "gif".into(),
        output.as_os_str().to_owned(),
    ]);
    args
}

#[async_trait]
impl VideoToolchain for FfmpegToolchain {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe_duration(&self, input: &Path) -> Result<Option<f64>> {
        let stdout = command::run(
            &self.ffprobe_path,
            probe_args(input),
            self.stage_timeout,
            "ffprobe",
        )
        .await?;
        parse_duration(&stdout)
    }

    #[tracing::instrument(skip(self), fields(ffmpeg.operation = "screenshot"))]
    async fn extract_frame(
        &self,
        input: &Path,
        at_seconds: f64,
        width: u32,
        output: &Path,
    ) -> Result<()> {
        self.ffmpeg(
            frame_args(input, at_seconds, width, output),
            "FFmpeg screenshot extraction",
        )
        .await
    }

    #[tracing::instrument(skip(self, filter), fields(ffmpeg.operation = "palettegen", speed_factor = filter.speed_factor))]
    async fn generate_palette(
        &self,
        input: &Path,
        filter: &GifFilter,
        output: &Path,
    ) -> Result<()> {
        self.ffmpeg(palette_args(input, filter, output), "FFmpeg palette generation")
            .await
    }

    #[tracing::instrument(skip(self, filter), fields(ffmpeg.operation = "paletteuse", speed_factor = filter.speed_factor))]
    async fn encode_gif(
        &self,
        input: &Path,
        palette: &Path,
        filter: &GifFilter,
        output: &Path,
    ) -> Result<()> {
        self.ffmpeg(gif_args(input, palette, filter, output), "FFmpeg GIF encoding")
            .await
    }
}
