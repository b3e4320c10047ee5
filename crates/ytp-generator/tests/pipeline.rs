//! End-to-end runs of the generation pipeline over a fake toolkit.

mod common;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use common::{
    dir_entries, output_clips, recording_sink, settings, AlwaysHigh, FakeToolkit,
};
use ytp_generator::{
    ClipScheduler, GenerationError, GenerationJob, JobState, ProgressTracker,
};
use ytp_models::{EffectId, EffectToggles, GenerationConfig};

/// Plain snippets only: no transitions, no effects.
fn plain_config(max_clips: u32, seed: u64) -> GenerationConfig {
    GenerationConfig {
        max_clips,
        insert_transition_clips: false,
        effect_probability: 0,
        seed: Some(seed),
        ..GenerationConfig::default()
    }
}

fn job_with(
    dir: &TempDir,
    toolkit: Arc<FakeToolkit>,
    config: GenerationConfig,
) -> GenerationJob {
    let mut job = GenerationJob::new(
        toolkit,
        settings(dir.path()),
        config,
        dir.path().join("output").join("ytp.mp4"),
    );
    job.add_source("sources/a.mp4");
    job.add_source("sources/b.mp4");
    job
}

fn expected_names(indices: impl IntoIterator<Item = u32>) -> Vec<String> {
    indices.into_iter().map(|i| format!("video{}.mp4", i)).collect()
}

#[tokio::test]
async fn test_manifest_order_ignores_reversed_completion() {
    let dir = TempDir::new().unwrap();
    let mut toolkit = FakeToolkit::new();
    // clip 0 finishes last, clip 7 first
    for i in 0..8u32 {
        toolkit = toolkit.with_delay(i, Duration::from_millis(u64::from(8 - i) * 15));
    }
    let toolkit = Arc::new(toolkit);
    let mut job = job_with(&dir, Arc::clone(&toolkit), plain_config(8, 1));

    let report = assert_ok!(job.go(None).await);

    assert_eq!(report.state, JobState::Completed);
    let completion_order = toolkit.extracted.lock().unwrap().clone();
    assert_ne!(completion_order, (0..8).collect::<Vec<_>>());
    assert_eq!(output_clips(job.output()).await, expected_names(0..8));
}

#[tokio::test]
async fn test_manifest_order_ignores_scrambled_completion() {
    let delays = [35u64, 5, 60, 20, 0, 45, 10, 25, 50, 15];
    let dir = TempDir::new().unwrap();
    let mut toolkit = FakeToolkit::new();
    for (i, ms) in delays.iter().enumerate() {
        toolkit = toolkit.with_delay(i as u32, Duration::from_millis(*ms));
    }
    let toolkit = Arc::new(toolkit);
    let mut job = job_with(&dir, Arc::clone(&toolkit), plain_config(10, 2));

    assert_ok!(job.go(None).await);

    assert_eq!(output_clips(job.output()).await, expected_names(0..10));
}

#[tokio::test]
async fn test_top_transition_draw_always_copies() {
    let dir = TempDir::new().unwrap();
    let toolkit = FakeToolkit::new();
    let sources = vec![PathBuf::from("sources/a.mp4")];

    for p in [1, 7, 100] {
        let config = GenerationConfig {
            max_clips: 6,
            transition_probability: p,
            effect_probability: 0,
            ..GenerationConfig::default()
        };
        let work_dir = dir.path().join(format!("p{}", p));
        std::fs::create_dir_all(&work_dir).unwrap();
        let tracker = ProgressTracker::new(config.progress_units(), None);

        let output = ClipScheduler::new(&toolkit, &sources, &config, &work_dir)
            .with_max_parallel(3)
            .run_all(&mut AlwaysHigh, &tracker)
            .await;

        assert_eq!(output.manifest.len(), 6);
        assert!(output.last_error.is_none());
    }

    assert_eq!(toolkit.copied.lock().unwrap().len(), 18);
    assert!(toolkit.extracted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_certain_single_effect_applies_exactly_once() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit::new());
    let config = GenerationConfig {
        effect_probability: 100,
        effects: EffectToggles::only(&[EffectId::Invert]),
        ..plain_config(10, 3)
    };
    let mut job = job_with(&dir, Arc::clone(&toolkit), config);

    let report = assert_ok!(job.go(None).await);

    assert_eq!(report.state, JobState::Completed);
    let by_clip = toolkit.effects_by_clip();
    assert_eq!(by_clip.len(), 10);
    assert!(by_clip.values().all(|e| e == &vec![EffectId::Invert]));
}

#[tokio::test]
async fn test_without_stacking_every_clip_gets_one_effect() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit::new().with_all_pools());
    let config = GenerationConfig {
        effect_probability: 100,
        allow_effect_stacking: false,
        max_stack_level: 5,
        ..plain_config(12, 4)
    };
    let mut job = job_with(&dir, Arc::clone(&toolkit), config);

    assert_ok!(job.go(None).await);

    let by_clip = toolkit.effects_by_clip();
    assert_eq!(by_clip.len(), 12);
    assert!(by_clip.values().all(|e| e.len() == 1));
}

#[tokio::test]
async fn test_stacked_effects_are_bounded_and_distinct() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit::new());
    let enabled = [
        EffectId::Reverse,
        EffectId::SpeedUp,
        EffectId::Chorus,
        EffectId::Flip,
        EffectId::Sus,
    ];
    let config = GenerationConfig {
        effect_probability: 100,
        max_stack_level: 2,
        effects: EffectToggles::only(&enabled),
        ..plain_config(50, 5)
    };
    let mut job = job_with(&dir, Arc::clone(&toolkit), config);

    assert_ok!(job.go(None).await);

    for (index, effects) in toolkit.effects_by_clip() {
        assert!((1..=2).contains(&effects.len()), "clip {}", index);
        let unique: HashSet<_> = effects.iter().collect();
        assert_eq!(unique.len(), effects.len(), "clip {} repeated an effect", index);
        assert!(effects.iter().all(|e| enabled.contains(e)));
    }
}

#[tokio::test]
async fn test_one_failed_clip_fails_the_run_but_keeps_the_rest() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit::new().failing(2));
    let mut job = job_with(&dir, Arc::clone(&toolkit), plain_config(5, 6));

    let report = assert_ok!(job.go(None).await);

    assert_eq!(report.state, JobState::Failed);
    assert_eq!(job.state(), JobState::Failed);
    assert!(matches!(
        job.error(),
        Some(GenerationError::ClipAcquisition { index: 2, .. })
    ));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 2);
    assert_eq!(report.clips_assembled, 4);
    assert_eq!(report.output.as_deref(), Some(job.output()));
    assert_eq!(output_clips(job.output()).await, expected_names([0, 1, 3, 4]));
    assert_eq!(dir_entries(&dir.path().join("work")), 0);
}

#[tokio::test]
async fn test_empty_effect_pool_fails_that_clip() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit::new());
    let config = GenerationConfig {
        effect_probability: 100,
        effects: EffectToggles::only(&[EffectId::MemeSound]),
        ..plain_config(3, 7)
    };
    let mut job = job_with(&dir, toolkit, config);

    let report = assert_ok!(job.go(None).await);

    assert_eq!(report.state, JobState::Failed);
    assert!(matches!(
        job.error(),
        Some(GenerationError::AssetPoolEmpty { .. })
    ));
    assert_eq!(report.failures.len(), 3);
    // nothing survived, so there was nothing to assemble
    assert!(report.output.is_none());
    assert!(!job.output().exists());
    assert_eq!(dir_entries(&dir.path().join("work")), 0);
}

#[tokio::test]
async fn test_failed_effect_drops_only_that_clip() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit::new().failing_effects(1));
    let config = GenerationConfig {
        effect_probability: 100,
        allow_effect_stacking: false,
        effects: EffectToggles::only(&[EffectId::Reverse]),
        ..plain_config(3, 11)
    };
    let mut job = job_with(&dir, Arc::clone(&toolkit), config);

    let report = assert_ok!(job.go(None).await);

    assert_eq!(report.state, JobState::Failed);
    assert!(matches!(
        job.error(),
        Some(GenerationError::Effect {
            index: 1,
            effect: EffectId::Reverse,
            ..
        })
    ));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.clips_assembled, 2);
    assert_eq!(output_clips(job.output()).await, expected_names([0, 2]));
    assert_eq!(toolkit.extracted.lock().unwrap().len(), 3);
    assert_eq!(dir_entries(&dir.path().join("work")), 0);
}

#[tokio::test]
async fn test_empty_transition_pool_is_an_acquisition_failure() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit {
        pools: HashSet::new(),
        ..FakeToolkit::new()
    });
    // a 1-in-1 draw makes every clip a transition
    let config = GenerationConfig {
        insert_transition_clips: true,
        transition_probability: 1,
        ..plain_config(2, 12)
    };
    let mut job = job_with(&dir, toolkit, config);

    let report = assert_ok!(job.go(None).await);

    assert_eq!(report.state, JobState::Failed);
    assert!(matches!(
        job.error(),
        Some(GenerationError::ClipAcquisition { .. })
    ));
    assert_eq!(report.failures.len(), 2);
    assert!(!job.output().exists());
}

#[tokio::test]
async fn test_assembly_failure_fails_a_clean_run() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit {
        fail_concat: true,
        ..FakeToolkit::new()
    });
    let mut job = job_with(&dir, Arc::clone(&toolkit), plain_config(4, 8));

    let report = assert_ok!(job.go(None).await);

    assert_eq!(report.state, JobState::Failed);
    assert!(report.failures.is_empty());
    assert!(matches!(job.error(), Some(GenerationError::Assembly(_))));
    assert_eq!(toolkit.concatenated.lock().unwrap().len(), 1);
    assert_eq!(dir_entries(&dir.path().join("work")), 0);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let dir = TempDir::new().unwrap();
    let mut toolkit = FakeToolkit::new();
    for i in 0..6u32 {
        toolkit = toolkit.with_delay(i, Duration::from_millis(u64::from(i % 3) * 10));
    }
    let mut job = job_with(&dir, Arc::new(toolkit), plain_config(6, 9));
    let (sink, seen) = recording_sink();

    assert_ok!(job.go(Some(sink)).await);

    let seen = seen.lock().unwrap();
    // two reports per clip plus the final one
    assert_eq!(seen.len(), 13);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|p| (0.0..=100.0).contains(p)));
    assert_eq!(*seen.last().unwrap(), 100.0);
}

#[tokio::test]
async fn test_progress_reaches_100_on_failure() {
    let dir = TempDir::new().unwrap();
    let toolkit = FakeToolkit::new().failing(0).failing(1);
    let mut job = job_with(&dir, Arc::new(toolkit), plain_config(2, 10));
    let (sink, seen) = recording_sink();

    let report = assert_ok!(job.go(Some(sink)).await);

    assert_eq!(report.state, JobState::Failed);
    assert_eq!(*seen.lock().unwrap().last().unwrap(), 100.0);
}

#[tokio::test]
async fn test_zero_clips_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let toolkit = Arc::new(FakeToolkit::new());
    let mut job = job_with(&dir, Arc::clone(&toolkit), plain_config(0, 11));
    let (sink, seen) = recording_sink();

    let err = assert_err!(job.go(Some(sink)).await);

    assert!(matches!(err, GenerationError::NothingToGenerate));
    assert_eq!(job.state(), JobState::Idle);
    assert!(seen.lock().unwrap().is_empty());
    assert!(!dir.path().join("work").exists());
    assert!(toolkit.concatenated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_sources_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("ytp.mp4");
    std::fs::write(&output, b"previous run").unwrap();
    let mut job = GenerationJob::new(
        Arc::new(FakeToolkit::new()),
        settings(dir.path()),
        plain_config(5, 12),
        &output,
    );
    let (sink, seen) = recording_sink();

    let err = assert_err!(job.go(Some(sink)).await);

    assert!(matches!(err, GenerationError::SourceUnavailable));
    assert_eq!(job.state(), JobState::Idle);
    assert!(seen.lock().unwrap().is_empty());
    assert!(!dir.path().join("work").exists());
    // rejected before any work, so the previous output is untouched
    assert!(output.exists());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = GenerationConfig {
        min_clip_duration: 1.0,
        max_clip_duration: 0.5,
        ..plain_config(3, 13)
    };
    let mut job = job_with(&dir, Arc::new(FakeToolkit::new()), config);

    let err = assert_err!(job.go(None).await);

    assert!(matches!(err, GenerationError::InvalidConfig(_)));
    assert_eq!(job.state(), JobState::Idle);
}

#[tokio::test]
async fn test_previous_output_is_replaced() {
    let dir = TempDir::new().unwrap();
    let mut job = job_with(&dir, Arc::new(FakeToolkit::new()), plain_config(2, 14));
    std::fs::create_dir_all(job.output().parent().unwrap()).unwrap();
    std::fs::write(job.output(), b"previous run").unwrap();

    assert_ok!(job.go(None).await);

    assert_eq!(output_clips(job.output()).await, expected_names(0..2));
}

#[tokio::test]
async fn test_job_runs_only_once() {
    let dir = TempDir::new().unwrap();
    let mut job = job_with(&dir, Arc::new(FakeToolkit::new()), plain_config(1, 15));

    assert_ok!(job.go(None).await);
    let err = assert_err!(job.go(None).await);

    assert!(matches!(
        err,
        GenerationError::InvalidState(JobState::Completed)
    ));
}

#[tokio::test]
async fn test_fixed_seed_reproduces_plans() {
    let config = GenerationConfig {
        effect_probability: 60,
        insert_transition_clips: true,
        transition_probability: 3,
        ..plain_config(20, 99)
    };
    let sources = vec![PathBuf::from("sources/a.mp4")];
    let toolkit = FakeToolkit::new();
    let work_dir = PathBuf::from("work");

    let plans = |seed: u64| {
        let scheduler = ClipScheduler::new(&toolkit, &sources, &config, &work_dir);
        let mut rng = ytp_generator::seeded_rng(Some(seed));
        scheduler
            .plan(&mut rng)
            .into_iter()
            .map(|(job, seed)| (job.plan, seed))
            .collect::<Vec<_>>()
    };

    assert_eq!(plans(99), plans(99));
    assert_ne!(plans(99), plans(100));
}
