//! Runtime configuration.

use std::path::PathBuf;

/// Generator runtime configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Parent of every per-run work directory
    pub work_dir: PathBuf,
    /// Root of the transition, sound and resource pools
    pub assets_dir: PathBuf,
    /// Maximum clip tasks running at once
    pub max_parallel: usize,
    /// Optional limit for each FFmpeg invocation, in seconds
    pub ffmpeg_timeout_secs: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("./temp"),
            assets_dir: PathBuf::from("."),
            max_parallel: default_parallelism(),
            ffmpeg_timeout_secs: None,
        }
    }
}

impl GeneratorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("YTP_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./temp")),
            assets_dir: std::env::var("YTP_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            max_parallel: std::env::var("YTP_MAX_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or_else(default_parallelism),
            ffmpeg_timeout_secs: std::env::var("YTP_FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs: &u64| *secs > 0),
        }
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_assets_dir(mut self, assets_dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = assets_dir.into();
        self
    }

    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }
}

/// The runtime's default parallelism.
fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
