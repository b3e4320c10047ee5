//! Execution of one clip task.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use ytp_media::{remove_if_exists, MediaError, MediaResult, MediaToolkit, WorkingClip};
use ytp_models::{AssetPool, ClipOutcome, ClipTask, EffectPlan, GenerationConfig};

use crate::error::{GenerationError, GenerationResult};
use crate::progress::{ErrorCell, ProgressTracker};
use crate::random::RandomSource;

/// Uniform choice from `items`; `None` when empty.
fn pick<'a, T, R: RandomSource + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.index(items.len()))
}

/// Everything a clip task reads while it runs.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    pub toolkit: &'a dyn MediaToolkit,
    pub sources: &'a [PathBuf],
    pub config: &'a GenerationConfig,
    pub progress: &'a ProgressTracker,
    pub errors: &'a ErrorCell,
}

/// One planned clip bound to its output path.
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub task: ClipTask,
    pub plan: EffectPlan,
}

impl ClipJob {
    pub fn new(task: ClipTask, plan: EffectPlan) -> Self {
        Self { task, plan }
    }

    pub fn index(&self) -> u32 {
        self.task.index
    }

    /// Acquire the clip, then apply its effects in order.
    ///
    /// Reports half a progress unit after acquisition and another after the
    /// effect stage, whatever the outcome. A failed task records its error
    /// and leaves no file at its path.
    pub async fn execute<R: RandomSource + Send>(
        &self,
        ctx: TaskContext<'_>,
        rng: &mut R,
    ) -> ClipOutcome {
        let index = self.task.index;

        let acquired = self.acquire(ctx, rng).await;
        ctx.progress.advance_half();

        let result = match acquired {
            Ok(clip) => self.apply_effects(ctx, clip, rng).await.map(|_| ()),
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(()) => ClipOutcome::Succeeded,
            Err(e) => {
                error!(
                    clip_index = index,
                    kind = %self.plan.kind,
                    error = %e,
                    "Clip could not be created"
                );
                if let Err(cleanup) = remove_if_exists(&self.task.path).await {
                    debug!(clip_index = index, error = %cleanup, "Failed to remove partial clip");
                }
                let message = e.to_string();
                ctx.errors.record(index, e);
                ClipOutcome::Failed(message)
            }
        };

        let percent = ctx.progress.advance_half();
        info!(
            clip_index = index,
            succeeded = outcome.is_succeeded(),
            "Clip {} done: {:.0}% complete",
            index,
            percent
        );

        let label = if outcome.is_succeeded() { "succeeded" } else { "failed" };
        metrics::counter!("ytp_clips_total", "outcome" => label).increment(1);

        outcome
    }

    /// Copy a transition or extract a snippet to the task's path.
    async fn acquire<R: RandomSource + Send>(
        &self,
        ctx: TaskContext<'_>,
        rng: &mut R,
    ) -> GenerationResult<WorkingClip> {
        let index = self.task.index;
        let dest = self.task.path.as_path();

        let result = if self.plan.is_transition() {
            self.copy_transition(ctx, dest, rng).await
        } else {
            self.extract_snippet(ctx, dest, rng).await
        };

        match result {
            Ok(()) => Ok(WorkingClip::new(dest)),
            Err(e) => Err(GenerationError::acquisition(index, e)),
        }
    }

    async fn copy_transition<R: RandomSource + Send>(
        &self,
        ctx: TaskContext<'_>,
        dest: &Path,
        rng: &mut R,
    ) -> MediaResult<()> {
        let candidates = ctx.toolkit.list_candidates(AssetPool::Transitions).await?;
        let transition =
            pick(&candidates, rng).ok_or(MediaError::NoAssetsFound(AssetPool::Transitions))?;
        debug!(
            clip_index = self.task.index,
            source = %transition.display(),
            "Copying transition clip"
        );
        ctx.toolkit.copy_file(transition, dest).await
    }

    async fn extract_snippet<R: RandomSource + Send>(
        &self,
        ctx: TaskContext<'_>,
        dest: &Path,
        rng: &mut R,
    ) -> MediaResult<()> {
        let source = pick(ctx.sources, rng)
            .ok_or_else(|| MediaError::InvalidVideo("no sources registered".to_string()))?;
        let length = ctx.toolkit.probe_duration(source).await?;

        let config = ctx.config;
        let start = rng.float_range(0.0, (length - config.max_clip_duration).max(0.0));
        let end = start + rng.float_range(config.min_clip_duration, config.max_clip_duration);

        debug!(
            clip_index = self.task.index,
            source = %source.display(),
            start = start,
            end = end,
            "Extracting snippet"
        );
        ctx.toolkit.extract_range(source, start, end, dest).await
    }

    /// Apply the planned effects strictly in order, each owning the clip in turn.
    async fn apply_effects<R: RandomSource + Send>(
        &self,
        ctx: TaskContext<'_>,
        mut clip: WorkingClip,
        rng: &mut R,
    ) -> GenerationResult<WorkingClip> {
        let index = self.task.index;

        for &effect in &self.plan.effects {
            let asset = match effect.required_pool() {
                Some(pool) => {
                    let candidates = ctx
                        .toolkit
                        .list_candidates(pool)
                        .await
                        .map_err(|e| GenerationError::effect(index, effect, e))?;
                    let asset = pick(&candidates, rng)
                        .ok_or(GenerationError::AssetPoolEmpty { index, pool })?;
                    Some(asset.clone())
                }
                None => None,
            };

            debug!(clip_index = index, effect = %effect, "Applying effect");
            clip = ctx
                .toolkit
                .apply_effect(effect, clip, asset)
                .await
                .map_err(|e| GenerationError::effect(index, effect, e))?;
        }

        Ok(clip)
    }
}
