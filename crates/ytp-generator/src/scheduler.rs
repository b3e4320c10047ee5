//! Concurrent execution of every clip task in a run.

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use ytp_media::MediaToolkit;
use ytp_models::{ClipOutcome, ClipTask, GenerationConfig};

use crate::error::GenerationError;
use crate::manifest::Manifest;
use crate::progress::{ClipFailure, ErrorCell, ProgressTracker};
use crate::random::{derive_task_seeds, RandomSource};
use crate::selector::EffectSelector;
use crate::task::{ClipJob, TaskContext};

/// What a run's clip stage leaves behind.
#[derive(Debug)]
pub struct SchedulerOutput {
    pub manifest: Manifest,
    /// Every failed task, by index
    pub failures: Vec<ClipFailure>,
    /// Content of the error cell once all tasks finished
    pub last_error: Option<GenerationError>,
}

/// Runs `max_clips` clip tasks concurrently and joins them all.
///
/// A failing task never cancels its siblings.
pub struct ClipScheduler<'a> {
    toolkit: &'a dyn MediaToolkit,
    sources: &'a [PathBuf],
    config: &'a GenerationConfig,
    work_dir: &'a Path,
    max_parallel: usize,
}

impl<'a> ClipScheduler<'a> {
    pub fn new(
        toolkit: &'a dyn MediaToolkit,
        sources: &'a [PathBuf],
        config: &'a GenerationConfig,
        work_dir: &'a Path,
    ) -> Self {
        Self {
            toolkit,
            sources,
            config,
            work_dir,
            max_parallel: 1,
        }
    }

    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Plan every clip in index order, then draw one seed per task.
    ///
    /// All draws from `rng` happen here, before any task starts, so a fixed
    /// master seed yields the same plans whatever order tasks finish in.
    pub fn plan<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Vec<(ClipJob, u64)> {
        let jobs: Vec<ClipJob> = (0..self.config.max_clips)
            .map(|index| {
                let plan = EffectSelector::plan(self.config, rng);
                ClipJob::new(ClipTask::new(self.work_dir, index), plan)
            })
            .collect();
        let seeds = derive_task_seeds(rng, self.config.max_clips);
        jobs.into_iter().zip(seeds).collect()
    }

    /// Plan and execute every clip, then build the manifest.
    pub async fn run_all<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        progress: &ProgressTracker,
    ) -> SchedulerOutput {
        let planned = self.plan(rng);
        self.execute(planned, progress).await
    }

    /// Execute already planned clips.
    pub async fn execute(
        &self,
        planned: Vec<(ClipJob, u64)>,
        progress: &ProgressTracker,
    ) -> SchedulerOutput {
        let errors = ErrorCell::new();
        let semaphore = Semaphore::new(self.max_parallel);
        let ctx = TaskContext {
            toolkit: self.toolkit,
            sources: self.sources,
            config: self.config,
            progress,
            errors: &errors,
        };

        info!(
            clips = planned.len(),
            max_parallel = self.max_parallel,
            "Starting clip tasks"
        );

        let semaphore = &semaphore;
        let futures = planned.into_iter().map(move |(job, seed)| async move {
            let _permit = semaphore.acquire().await.ok();
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = job.execute(ctx, &mut rng).await;
            (job.task, outcome)
        });
        let results: Vec<(ClipTask, ClipOutcome)> = join_all(futures).await;

        let manifest =
            Manifest::from_tasks(results.iter().map(|(task, outcome)| (task, outcome))).await;
        let (last_error, failures) = errors.into_parts();

        if !failures.is_empty() {
            let indices: Vec<u32> = failures.iter().map(|f| f.index).collect();
            warn!(failed_clips = ?indices, "Some clip tasks failed");
        }
        info!(
            succeeded = manifest.len(),
            failed = failures.len(),
            "All clip tasks finished"
        );

        SchedulerOutput {
            manifest,
            failures,
            last_error,
        }
    }
}
