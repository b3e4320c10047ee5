//! Randomized clip-assembly pipeline.
//!
//! A [`GenerationJob`] plans `max_clips` clips up front, runs them
//! concurrently through a [`MediaToolkit`](ytp_media::MediaToolkit), orders
//! the survivors by index and concatenates them into one output file.
//!
//! - [`selector`]: transition and effect-stack decisions per clip
//! - [`task`]: acquisition and in-order effect application for one clip
//! - [`scheduler`]: bounded fan-out and join of all clip tasks
//! - [`manifest`] / [`assembler`]: ordering and concatenation
//! - [`job`]: the `Idle -> Running -> Completed | Failed` state machine

pub mod assembler;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod manifest;
pub mod progress;
pub mod random;
pub mod report;
pub mod scheduler;
pub mod selector;
pub mod task;

pub use assembler::Assembler;
pub use config::GeneratorConfig;
pub use error::{GenerationError, GenerationResult};
pub use job::{GenerationJob, JobState};
pub use logging::{init_tracing, RunLogger};
pub use manifest::Manifest;
pub use progress::{ClipFailure, ErrorCell, ProgressSink, ProgressTracker};
pub use random::{derive_task_seeds, seeded_rng, RandomSource};
pub use report::RunReport;
pub use scheduler::{ClipScheduler, SchedulerOutput};
pub use selector::EffectSelector;
pub use task::{ClipJob, TaskContext};
