//! In-memory media toolkit for driving the pipeline without FFmpeg.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::fs;

use ytp_generator::{GeneratorConfig, ProgressSink, RandomSource};
use ytp_media::{MediaError, MediaResult, MediaToolkit, WorkingClip};
use ytp_models::{AssetPool, EffectId};

/// Index of the clip a `video{i}.mp4` path belongs to.
pub fn clip_index(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix("video"))
        .and_then(|s| s.parse().ok())
        .unwrap_or(u32::MAX)
}

/// Writes tiny placeholder clips and records every call.
#[derive(Default)]
pub struct FakeToolkit {
    /// Acquisition of these clip indices fails
    pub fail_clips: HashSet<u32>,
    /// Per-clip delay before acquisition completes
    pub delays: HashMap<u32, Duration>,
    /// Pools that have files; every other pool is empty
    pub pools: HashSet<AssetPool>,
    pub fail_concat: bool,
    /// Every effect step on these clip indices fails
    pub fail_effects: HashSet<u32>,

    pub extracted: Mutex<Vec<u32>>,
    pub copied: Mutex<Vec<u32>>,
    pub effects: Mutex<Vec<(u32, EffectId)>>,
    pub concatenated: Mutex<Vec<Vec<PathBuf>>>,
}

impl FakeToolkit {
    pub fn new() -> Self {
        let mut pools = HashSet::new();
        pools.insert(AssetPool::Transitions);
        Self {
            pools,
            ..Self::default()
        }
    }

    pub fn with_all_pools(mut self) -> Self {
        self.pools.extend(AssetPool::ALL.iter().copied());
        self
    }

    pub fn failing(mut self, index: u32) -> Self {
        self.fail_clips.insert(index);
        self
    }

    pub fn failing_effects(mut self, index: u32) -> Self {
        self.fail_effects.insert(index);
        self
    }

    pub fn with_delay(mut self, index: u32, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }

    /// Effects applied to each clip, in application order.
    pub fn effects_by_clip(&self) -> HashMap<u32, Vec<EffectId>> {
        let mut by_clip: HashMap<u32, Vec<EffectId>> = HashMap::new();
        for (index, effect) in self.effects.lock().unwrap().iter() {
            by_clip.entry(*index).or_default().push(*effect);
        }
        by_clip
    }

    async fn acquire(&self, dest: &Path, body: &str) -> MediaResult<()> {
        let index = clip_index(dest);
        if let Some(delay) = self.delays.get(&index) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_clips.contains(&index) {
            return Err(MediaError::FileNotFound(dest.to_path_buf()));
        }
        fs::write(dest, body).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaToolkit for FakeToolkit {
    async fn probe_duration(&self, _path: &Path) -> MediaResult<f64> {
        Ok(10.0)
    }

    async fn extract_range(&self, source: &Path, start: f64, end: f64, dest: &Path) -> MediaResult<()> {
        assert!(start >= 0.0 && end > start, "bad range {}..{}", start, end);
        self.acquire(dest, &format!("snippet of {}", source.display())).await?;
        self.extracted.lock().unwrap().push(clip_index(dest));
        Ok(())
    }

    async fn copy_file(&self, source: &Path, dest: &Path) -> MediaResult<()> {
        self.acquire(dest, &format!("copy of {}", source.display())).await?;
        self.copied.lock().unwrap().push(clip_index(dest));
        Ok(())
    }

    async fn list_candidates(&self, pool: AssetPool) -> MediaResult<Vec<PathBuf>> {
        if self.pools.contains(&pool) {
            Ok(vec![PathBuf::from(pool.relative_dir()).join("asset0")])
        } else {
            Err(MediaError::NoAssetsFound(pool))
        }
    }

    async fn apply_effect(
        &self,
        effect: EffectId,
        clip: WorkingClip,
        asset: Option<PathBuf>,
    ) -> MediaResult<WorkingClip> {
        assert_eq!(effect.required_pool().is_some(), asset.is_some());
        assert!(clip.path().is_file(), "effect on missing clip");
        let index = clip_index(clip.path());
        if self.fail_effects.contains(&index) {
            return Err(MediaError::ffmpeg_failed("effect failed", None, Some(1)));
        }
        self.effects.lock().unwrap().push((index, effect));
        Ok(clip)
    }

    async fn concatenate(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()> {
        self.concatenated.lock().unwrap().push(clips.to_vec());
        if self.fail_concat {
            return Err(MediaError::ffmpeg_failed("concat failed", None, Some(1)));
        }
        let names: Vec<String> = clips
            .iter()
            .filter_map(|c| c.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        fs::write(output, names.join("\n")).await?;
        Ok(())
    }
}

/// Answers every draw with the top of its range.
pub struct AlwaysHigh;

impl RandomSource for AlwaysHigh {
    fn int_inclusive(&mut self, _lo: u32, hi: u32) -> u32 {
        hi
    }
    fn float_range(&mut self, _lo: f64, hi: f64) -> f64 {
        hi
    }
    fn index(&mut self, len: usize) -> usize {
        len.saturating_sub(1)
    }
    fn seed(&mut self) -> u64 {
        0
    }
}

/// Runtime settings rooted in a test directory.
pub fn settings(root: &Path) -> GeneratorConfig {
    GeneratorConfig::default()
        .with_work_dir(root.join("work"))
        .with_assets_dir(root.join("assets"))
        .with_max_parallel(8)
}

/// A progress sink that records every report.
pub fn recording_sink() -> (ProgressSink, Arc<Mutex<Vec<f64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let sink: ProgressSink = Arc::new(move |p| sink_seen.lock().unwrap().push(p));
    (sink, seen)
}

/// Clip file names listed in a fake-concatenated output.
pub async fn output_clips(output: &Path) -> Vec<String> {
    fs::read_to_string(output)
        .await
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Entries left in a directory (missing counts as empty).
pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
