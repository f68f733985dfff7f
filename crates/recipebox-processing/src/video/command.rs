//! External process execution

use anyhow::{anyhow, bail, Context, Result};
use std::ffi::OsString;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Longest stderr excerpt carried into an error message
const MAX_STDERR_CHARS: usize = 2000;

/// Validate that an executable path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_executable(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() {
        return Err(anyhow!("Executable path is empty"));
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }
    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }
    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\' | ':'))
    {
        return Err(anyhow!("Path contains unsafe characters: {}", path));
    }
    Ok(())
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(MAX_STDERR_CHARS);
    text.chars().skip(skip).collect()
}

/// Run `program` to completion and return its stdout.
///
/// The child is killed if `timeout` elapses or if the returned future is dropped,
/// so an abandoned request never leaves ffmpeg running.
pub(crate) async fn run(
    program: &str,
    args: Vec<OsString>,
    timeout: Duration,
    operation: &'static str,
) -> Result<Vec<u8>> {
    let start = Instant::now();

    let child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to execute {}", program))?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.with_context(|| format!("Failed to wait for {}", program))?,
        Err(_) => bail!("{} timed out after {}s", operation, timeout.as_secs()),
    };

    if !output.status.success() {
        bail!(
            "{} failed ({}): {}",
            operation,
            output.status,
            stderr_excerpt(&output.stderr)
        );
    }

    tracing::debug!(
        process.executable.name = %program,
        operation = operation,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "External process finished"
    );

    Ok(output.stdout)
}
