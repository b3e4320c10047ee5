//! The media primitives the pipeline drives, behind one trait.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use ytp_models::{AssetPool, EffectId};

use crate::assets::AssetLibrary;
use crate::clip::{copy_clip, extract_range};
use crate::command::FfmpegRunner;
use crate::concat::{concat_clips, ensure_audio_track};
use crate::effects::WorkingClip;
use crate::error::MediaResult;
use crate::probe::probe_duration;

/// External operations consumed by the clip-assembly pipeline.
///
/// Implementations must be safe to call from many tasks at once; no two
/// concurrent calls ever share a destination path.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Duration of `path` in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Cut `[start, end)` of `source` into `dest`.
    async fn extract_range(&self, source: &Path, start: f64, end: f64, dest: &Path) -> MediaResult<()>;

    /// Copy `source` verbatim to `dest`.
    async fn copy_file(&self, source: &Path, dest: &Path) -> MediaResult<()>;

    /// Candidate files in `pool`; fails with `NoAssetsFound` when empty.
    async fn list_candidates(&self, pool: AssetPool) -> MediaResult<Vec<PathBuf>>;

    /// Transform `clip` in place, handing back the new owner.
    async fn apply_effect(
        &self,
        effect: EffectId,
        clip: WorkingClip,
        asset: Option<PathBuf>,
    ) -> MediaResult<WorkingClip>;

    /// Concatenate `clips` in order into `output`, which must end up with an audio stream.
    async fn concatenate(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()>;
}

/// Production toolkit backed by the FFmpeg and FFprobe CLIs.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    assets: AssetLibrary,
    runner: FfmpegRunner,
}

impl FfmpegToolkit {
    pub fn new(assets: AssetLibrary) -> Self {
        Self {
            assets,
            runner: FfmpegRunner::new(),
        }
    }

    /// Bound every FFmpeg invocation by `secs`.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.runner = self.runner.with_optional_timeout(secs);
        self
    }

    pub fn assets(&self) -> &AssetLibrary {
        &self.assets
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        probe_duration(path).await
    }

    async fn extract_range(&self, source: &Path, start: f64, end: f64, dest: &Path) -> MediaResult<()> {
        extract_range(&self.runner, source, start, end, dest).await
    }

    async fn copy_file(&self, source: &Path, dest: &Path) -> MediaResult<()> {
        copy_clip(source, dest).await
    }

    async fn list_candidates(&self, pool: AssetPool) -> MediaResult<Vec<PathBuf>> {
        self.assets.list_candidates(pool).await
    }

    async fn apply_effect(
        &self,
        effect: EffectId,
        clip: WorkingClip,
        asset: Option<PathBuf>,
    ) -> MediaResult<WorkingClip> {
        clip.transform(&self.runner, effect, asset.as_deref()).await
    }

    async fn concatenate(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()> {
        concat_clips(&self.runner, clips, output).await?;
        if ensure_audio_track(&self.runner, output).await? {
            info!("Added silent audio track to {}", output.display());
        }
        Ok(())
    }
}
