//! Top-level orchestration of one generation run.
//!
//! ```text
//! Idle --go()--> Running --+--> Completed
//!                          +--> Failed
//! ```
//!
//! Rejected calls leave the job `Idle` and touch nothing on disk. Leaving
//! `Running` always removes the run's work directory and always brings
//! progress to 100.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::Instrument;
use uuid::Uuid;

use ytp_media::{remove_if_exists, MediaToolkit};
use ytp_models::GenerationConfig;

use crate::assembler::Assembler;
use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::logging::RunLogger;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::random::seeded_rng;
use crate::report::RunReport;
use crate::scheduler::{ClipScheduler, SchedulerOutput};

/// Lifecycle of a [`GenerationJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation request: sources, settings and an output path.
pub struct GenerationJob {
    toolkit: Arc<dyn MediaToolkit>,
    settings: GeneratorConfig,
    config: GenerationConfig,
    output: PathBuf,
    sources: Vec<PathBuf>,
    state: JobState,
    error: Option<GenerationError>,
}

impl GenerationJob {
    pub fn new(
        toolkit: Arc<dyn MediaToolkit>,
        settings: GeneratorConfig,
        config: GenerationConfig,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            toolkit,
            settings,
            config,
            output: output.into(),
            sources: Vec::new(),
            state: JobState::Idle,
            error: None,
        }
    }

    pub fn add_source(&mut self, source: impl Into<PathBuf>) {
        self.sources.push(source.into());
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The error a failed run surfaced.
    pub fn error(&self) -> Option<&GenerationError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<GenerationError> {
        self.error.take()
    }

    /// Run the whole pipeline once.
    ///
    /// Returns `Err` only when the call is rejected before any work starts.
    /// A run that started always yields a report; a `Failed` report's error
    /// is also kept on the job (see [`GenerationJob::error`]).
    pub async fn go(&mut self, progress: Option<ProgressSink>) -> GenerationResult<RunReport> {
        self.check_ready()?;

        self.state = JobState::Running;
        let run_id = Uuid::new_v4();
        let logger = RunLogger::new(run_id, self.config.max_clips);
        let span = logger.span();
        Ok(self.drive(run_id, logger, progress).instrument(span).await)
    }

    async fn drive(
        &mut self,
        run_id: Uuid,
        logger: RunLogger,
        progress: Option<ProgressSink>,
    ) -> RunReport {
        let started_at = Utc::now();

        logger.started(self.sources.len(), &self.output);

        match remove_if_exists(&self.output).await {
            Ok(true) => logger.previous_output_removed(&self.output),
            Ok(false) => {}
            Err(e) => logger.warning(&format!("Could not remove previous output: {}", e)),
        }

        let work_dir = self.settings.work_dir.join(run_id.to_string());
        let tracker = ProgressTracker::new(self.config.progress_units(), progress);

        let (scheduled, assembly) = self.run(&work_dir, &tracker).await;
        let SchedulerOutput {
            manifest,
            failures,
            last_error,
        } = scheduled;

        self.clean_up(&work_dir, &logger).await;
        let percent = tracker.finish();
        logger.concatenated(percent);

        // A task failure is the root cause when assembly also failed.
        let produced_output = assembly.is_ok();
        let verdict = last_error.or(assembly.err());

        self.state = if verdict.is_some() {
            JobState::Failed
        } else {
            JobState::Completed
        };
        metrics::counter!("ytp_runs_total", "state" => self.state.as_str()).increment(1);

        logger.finished(self.state, manifest.len(), verdict.as_ref());

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            state: self.state,
            clips_requested: self.config.max_clips,
            clips_assembled: if produced_output { manifest.len() } else { 0 },
            failures,
            output: produced_output.then(|| self.output.clone()),
            error: verdict.as_ref().map(|e| e.to_string()),
        };
        self.error = verdict;

        report
    }

    /// Reject calls that must not start a run.
    fn check_ready(&self) -> GenerationResult<()> {
        if self.state != JobState::Idle {
            return Err(GenerationError::InvalidState(self.state));
        }
        if self.sources.is_empty() {
            tracing::warn!("No sources added");
            return Err(GenerationError::SourceUnavailable);
        }
        if self.config.max_clips == 0 {
            return Err(GenerationError::NothingToGenerate);
        }
        self.config.validate()?;
        Ok(())
    }

    /// Clip stage then assembly. A work directory that cannot be created
    /// surfaces as the assembly result with an empty clip stage.
    async fn run(
        &self,
        work_dir: &Path,
        tracker: &ProgressTracker,
    ) -> (SchedulerOutput, GenerationResult<()>) {
        if let Err(e) = fs::create_dir_all(work_dir).await {
            let empty = SchedulerOutput {
                manifest: Default::default(),
                failures: Vec::new(),
                last_error: None,
            };
            return (empty, Err(GenerationError::Io(e)));
        }

        let toolkit = self.toolkit.as_ref();
        let mut rng = seeded_rng(self.config.seed);
        let scheduled = ClipScheduler::new(toolkit, &self.sources, &self.config, work_dir)
            .with_max_parallel(self.settings.max_parallel)
            .run_all(&mut rng, tracker)
            .await;

        let assembly = Assembler::new(toolkit, work_dir)
            .assemble(&scheduled.manifest, &self.output)
            .await;

        (scheduled, assembly)
    }

    /// Remove the work directory. Failures are logged, never escalated.
    async fn clean_up(&self, work_dir: &Path, logger: &RunLogger) {
        match fs::remove_dir_all(work_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                let err = GenerationError::cleanup(format!("{}: {}", work_dir.display(), e));
                logger.warning(&err.to_string());
            }
        }
    }
}
