//! Concat-demuxer assembly and silent-audio backfill.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::has_audio_stream;

/// Silent stereo source used when a result has no audio stream.
pub const SILENT_AUDIO_SOURCE: &str = "anullsrc=channel_layout=stereo:sample_rate=44100";

/// Render the concat-demuxer list for `clips`, one `file '<path>'` line each.
pub fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| {
            let escaped = clip.to_string_lossy().replace('\'', "'\\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

/// Write the concat-demuxer list file.
pub async fn write_concat_list(list_path: &Path, clips: &[PathBuf]) -> MediaResult<()> {
    fs::write(list_path, concat_list(clips)).await?;
    Ok(())
}

/// Concatenate `clips` in order into `output` with stream copy.
///
/// The list file is written next to `output`. The demuxer resolves list
/// entries against the list's own directory, so entries are made absolute.
pub async fn concat_clips(runner: &FfmpegRunner, clips: &[PathBuf], output: &Path) -> MediaResult<()> {
    if clips.is_empty() {
        return Err(MediaError::EmptyConcat);
    }

    let entries = clips
        .iter()
        .map(std::path::absolute)
        .collect::<Result<Vec<_>, _>>()?;

    let list_path = output.with_extension("concat.txt");
    write_concat_list(&list_path, &entries).await?;

    info!("Concatenating {} clips -> {}", clips.len(), output.display());

    let cmd = FfmpegCommand::new(&list_path, output)
        .concat_demuxer()
        .codec_copy();
    let result = runner.run(&cmd).await;

    if let Err(e) = fs::remove_file(&list_path).await {
        debug!("Failed to remove concat list {}: {}", list_path.display(), e);
    }

    result
}

/// Build the command that muxes silence under the video of `input`.
pub fn silent_audio_command(input: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .add_lavfi_input(SILENT_AUDIO_SOURCE)
        .map("0:v")
        .map("1:a")
        .video_codec("copy")
        .audio_codec("aac")
        .shortest()
}

/// Make sure `path` carries an audio stream, synthesizing silence if not.
///
/// Returns `true` when silence was added.
pub async fn ensure_audio_track(runner: &FfmpegRunner, path: &Path) -> MediaResult<bool> {
    if has_audio_stream(path).await? {
        return Ok(false);
    }

    info!("No audio stream in {}, adding silent track", path.display());

    let staged = path.with_extension("noaudio.mp4");
    fs::rename(path, &staged).await?;

    let result = runner.run(&silent_audio_command(&staged, path)).await;
    if result.is_err() {
        restore_staged(&staged, path).await;
    } else if let Err(e) = fs::remove_file(&staged).await {
        debug!("Failed to remove staged file {}: {}", staged.display(), e);
    }

    result.map(|_| true)
}

/// Move the audio-less original back after a failed backfill.
async fn restore_staged(staged: &Path, path: &Path) -> bool {
    match fs::rename(staged, path).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "Failed to restore {} from {}: {}",
                path.display(),
                staged.display(),
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_concat_list_preserves_order_and_escapes() {
        let clips = vec![
            PathBuf::from("/work/video0.mp4"),
            PathBuf::from("/work/it's.mp4"),
            PathBuf::from("/work/video2.mp4"),
        ];
        let list = concat_list(&clips);
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines[0], "file '/work/video0.mp4'");
        assert_eq!(lines[1], r"file '/work/it'\''s.mp4'");
        assert_eq!(lines[2], "file '/work/video2.mp4'");
    }

    #[test]
    fn test_silent_audio_command_maps_both_inputs() {
        let args = silent_audio_command(Path::new("in.mp4"), Path::new("out.mp4")).build_args();
        assert!(args.contains(&SILENT_AUDIO_SOURCE.to_string()));
        assert!(args.contains(&"1:a".to_string()));
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[tokio::test]
    async fn test_concat_rejects_empty_manifest() {
        let dir = TempDir::new().unwrap();
        let err = concat_clips(&FfmpegRunner::new(), &[], &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EmptyConcat));
    }

    #[tokio::test]
    async fn test_restore_staged_puts_original_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assembled.mp4");
        let staged = path.with_extension("noaudio.mp4");
        fs::write(&staged, b"video").await.unwrap();

        assert!(restore_staged(&staged, &path).await);
        assert!(path.is_file());
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_restore_staged_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assembled.mp4");

        assert!(!restore_staged(&path.with_extension("noaudio.mp4"), &path).await);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_concat_list() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("concat.txt");
        write_concat_list(&list, &[dir.path().join("video1.mp4")]).await.unwrap();
        let content = fs::read_to_string(&list).await.unwrap();
        assert!(content.ends_with("video1.mp4'\n"));
    }
}
