//! Command-line clip montage generator.

use anyhow::Context as _;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use ytp_generator::{init_tracing, GenerationJob, GeneratorConfig, ProgressSink};
use ytp_media::{check_ffmpeg, check_ffprobe, AssetLibrary, FfmpegToolkit};
use ytp_models::{EffectId, EffectToggles, GenerationConfig};

#[derive(Parser, Debug)]
#[command(
    name = "ytp-generator",
    version,
    about = "Assemble one video from random, randomly transformed fragments of source videos"
)]
struct Cli {
    /// Source videos to cut fragments from.
    #[arg(required_unless_present = "list_effects")]
    sources: Vec<PathBuf>,

    /// Output video path.
    #[arg(short, long, default_value = "output/ytp.mp4")]
    output: PathBuf,

    /// Generation settings JSON; flags below override it.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of clips to generate.
    #[arg(long)]
    max_clips: Option<u32>,

    /// Shortest fragment, in seconds.
    #[arg(long)]
    min_duration: Option<f64>,

    /// Longest fragment, in seconds.
    #[arg(long)]
    max_duration: Option<f64>,

    /// Never insert transition clips.
    #[arg(long)]
    no_transitions: bool,

    /// One clip in N is a transition clip.
    #[arg(long)]
    transition_probability: Option<u32>,

    /// Chance in percent that a clip gets effects.
    #[arg(long)]
    effect_probability: Option<u32>,

    /// Apply at most one effect per clip.
    #[arg(long)]
    no_stacking: bool,

    /// Most effects stacked on one clip.
    #[arg(long)]
    max_stack_level: Option<u32>,

    /// Comma-separated effect keys to enable (default: all).
    #[arg(long, value_delimiter = ',')]
    effects: Option<Vec<EffectId>>,

    /// Effect key to disable; repeatable.
    #[arg(long = "disable-effect")]
    disable_effect: Vec<EffectId>,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Root of the transition, sound and resource folders.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Write a JSON run report here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the effect catalog and exit.
    #[arg(long)]
    list_effects: bool,
}

impl Cli {
    /// Settings file (or defaults) with flag overrides applied.
    fn generation_config(&self) -> anyhow::Result<GenerationConfig> {
        let mut config = match &self.settings {
            Some(path) => read_settings(path)?,
            None => GenerationConfig::default(),
        };

        if let Some(n) = self.max_clips {
            config.max_clips = n;
        }
        if let Some(min) = self.min_duration {
            config.min_clip_duration = min;
        }
        if let Some(max) = self.max_duration {
            config.max_clip_duration = max;
        }
        if self.no_transitions {
            config.insert_transition_clips = false;
        }
        if let Some(p) = self.transition_probability {
            config.transition_probability = p;
        }
        if let Some(p) = self.effect_probability {
            config.effect_probability = p;
        }
        if self.no_stacking {
            config.allow_effect_stacking = false;
        }
        if let Some(level) = self.max_stack_level {
            config.max_stack_level = level;
        }
        if let Some(effects) = &self.effects {
            config.effects = EffectToggles::only(effects);
        }
        for effect in &self.disable_effect {
            config.effects.set(*effect, false);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_settings(path: &Path) -> anyhow::Result<GenerationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read settings '{}'", path.display()))?;
    let config = serde_json::from_str(&raw).with_context(|| "parse settings JSON")?;
    Ok(config)
}

fn print_effects() {
    for effect in EffectId::ALL {
        let pool = effect
            .required_pool()
            .map(|pool| pool.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>2}  {:<20} {:<24} {}",
            effect.index(),
            effect.as_str(),
            effect.name(),
            pool
        );
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = cli.generation_config()?;

    let mut settings = GeneratorConfig::from_env();
    if let Some(dir) = &cli.assets_dir {
        settings = settings.with_assets_dir(dir);
    }
    info!("Generator config: {:?}", settings);

    check_ffmpeg()?;
    check_ffprobe()?;

    let toolkit = FfmpegToolkit::new(AssetLibrary::new(&settings.assets_dir))
        .with_timeout(settings.ffmpeg_timeout_secs);

    let mut job = GenerationJob::new(Arc::new(toolkit), settings, config, &cli.output);
    for source in &cli.sources {
        job.add_source(source);
    }

    let progress: ProgressSink = Arc::new(|percent| {
        info!(progress = percent, "{:.0}% complete", percent);
    });

    let report = job.go(Some(progress)).await?;

    if let Some(path) = &cli.report {
        if let Err(e) = report.save(path).await {
            error!("Failed to write report {}: {}", path.display(), e);
        }
    }

    match job.error() {
        None => info!(
            "Done: {} ({} of {} clips, {:.1}s)",
            cli.output.display(),
            report.clips_assembled,
            report.clips_requested,
            report.duration_secs()
        ),
        Some(e) => error!("Generation failed: {}", e),
    }

    Ok(report.succeeded())
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    if cli.list_effects {
        print_effects();
        return;
    }

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
