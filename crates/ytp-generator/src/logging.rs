//! Structured run logging and subscriber setup.

use std::path::Path;
use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use crate::error::GenerationError;
use crate::job::JobState;

/// Lifecycle lines of one generation run.
///
/// Each line carries the run id and the requested clip count, so output
/// from overlapping runs can be told apart.
#[derive(Debug, Clone, Copy)]
pub struct RunLogger {
    run_id: Uuid,
    clips: u32,
}

impl RunLogger {
    pub fn new(run_id: Uuid, clips: u32) -> Self {
        Self { run_id, clips }
    }

    /// Span attaching the run fields to everything the clip tasks log.
    pub fn span(&self) -> Span {
        tracing::info_span!("generate", run_id = %self.run_id, clips = self.clips)
    }

    pub fn started(&self, sources: usize, output: &Path) {
        info!(
            run_id = %self.run_id,
            clips = self.clips,
            sources = sources,
            output = %output.display(),
            "Generation started"
        );
    }

    pub fn previous_output_removed(&self, output: &Path) {
        info!(run_id = %self.run_id, output = %output.display(), "Removed previous output");
    }

    pub fn concatenated(&self, percent: f64) {
        info!(run_id = %self.run_id, "Concatenation done: {:.0}% complete", percent);
    }

    /// Problems that never change the verdict.
    pub fn warning(&self, message: &str) {
        warn!(run_id = %self.run_id, "{}", message);
    }

    /// Terminal line of the run.
    pub fn finished(&self, state: JobState, assembled: usize, error: Option<&GenerationError>) {
        match error {
            Some(e) => error!(
                run_id = %self.run_id,
                state = %state,
                clip_index = ?e.clip_index(),
                error = %e,
                "Generation failed"
            ),
            None => info!(
                run_id = %self.run_id,
                state = %state,
                "Generation completed: {} of {} clips assembled",
                assembled,
                self.clips
            ),
        }
    }
}

/// Install the global subscriber: ANSI text by default, JSON when `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    for directive in ["ytp_generator=info", "ytp_media=info"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
