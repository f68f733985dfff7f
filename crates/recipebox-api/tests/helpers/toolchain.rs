use async_trait::async_trait;
use recipebox_processing::{GifFilter, VideoToolchain};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted stand-in for ffprobe/ffmpeg that writes placeholder files.
pub struct FakeToolchain {
    pub duration: Option<f64>,
    pub fail_probe: bool,
    pub fail_screenshots: bool,
    pub fail_palette: bool,
    pub frames_extracted: AtomicUsize,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self {
            duration: Some(12.0),
            fail_probe: false,
            fail_screenshots: false,
            fail_palette: false,
            frames_extracted: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VideoToolchain for FakeToolchain {
    async fn probe_duration(&self, _input: &Path) -> anyhow::Result<Option<f64>> {
        if self.fail_probe {
            anyhow::bail!("Invalid data found when processing input");
        }
        Ok(self.duration)
    }

    async fn extract_frame(
        &self,
        _input: &Path,
        _at_seconds: f64,
        _width: u32,
        output: &Path,
    ) -> anyhow::Result<()> {
        if self.fail_screenshots && self.frames_extracted.load(Ordering::SeqCst) >= 1 {
            anyhow::bail!("decoder error");
        }
        self.frames_extracted.fetch_add(1, Ordering::SeqCst);
        std::fs::write(output, b"png")?;
        Ok(())
    }

    async fn generate_palette(
        &self,
        _input: &Path,
        _filter: &GifFilter,
        output: &Path,
    ) -> anyhow::Result<()> {
        if self.fail_palette {
            anyhow::bail!("palettegen failed");
        }
        std::fs::write(output, b"palette")?;
        Ok(())
    }

    async fn encode_gif(
        &self,
        _input: &Path,
        _palette: &Path,
        _filter: &GifFilter,
        output: &Path,
    ) -> anyhow::Result<()> {
        std::fs::write(output, b"GIF89a")?;
        Ok(())
    }
}
