//! ffprobe output parsing

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    duration: Option<String>,
}

/// Container duration in seconds from `ffprobe -print_format json` output.
///
/// Unparseable JSON is an error. A missing or `N/A` duration is `Ok(None)`; the
/// caller decides the fallback.
pub fn parse_duration(json: &[u8]) -> Result<Option<f64>> {
    let output: ProbeOutput =
        serde_json::from_slice(json).context("Failed to parse ffprobe output")?;

    let from_format = output
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok());

    let duration = from_format.or_else(|| {
        output
            .streams
            .iter()
            .filter_map(|s| s.duration.as_deref())
            .find_map(|d| d.trim().parse::<f64>().ok())
    });

    Ok(duration)
}
