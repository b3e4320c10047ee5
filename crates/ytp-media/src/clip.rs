//! Clip acquisition: range extraction and verbatim copies.

use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Shortest range FFmpeg is asked to cut, in seconds.
pub const MIN_EXTRACT_DURATION: f64 = 0.01;

/// Build the stream-copy command that cuts `[start, end)` out of `source`.
pub fn extract_command(source: &Path, start: f64, end: f64, dest: &Path) -> FfmpegCommand {
    let duration = (end - start).max(MIN_EXTRACT_DURATION);
    FfmpegCommand::new(source, dest)
        .seek(start.max(0.0))
        .duration(duration)
        .codec_copy()
}

/// Extract the range `[start, end)` of `source` into `dest` without re-encoding.
pub async fn extract_range(
    runner: &FfmpegRunner,
    source: &Path,
    start: f64,
    end: f64,
    dest: &Path,
) -> MediaResult<()> {
    if !source.exists() {
        return Err(MediaError::FileNotFound(source.to_path_buf()));
    }

    debug!(
        "Extracting range: {} -> {} (start: {:.3}s, end: {:.3}s)",
        source.display(),
        dest.display(),
        start,
        end
    );

    runner.run(&extract_command(source, start, end, dest)).await
}

/// Copy `source` verbatim to `dest`.
pub async fn copy_clip(source: &Path, dest: &Path) -> MediaResult<()> {
    if !source.exists() {
        return Err(MediaError::FileNotFound(source.to_path_buf()));
    }
    fs::copy(source, dest).await?;
    Ok(())
}
