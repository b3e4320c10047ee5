//! Clip task identity and outcome.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the clip produced by task `index`.
pub fn clip_filename(index: u32) -> String {
    format!("video{}.mp4", index)
}

/// One numbered unit of work; its path is derived from the index alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipTask {
    pub index: u32,
    pub path: PathBuf,
}

impl ClipTask {
    pub fn new(work_dir: impl AsRef<Path>, index: u32) -> Self {
        Self {
            index,
            path: work_dir.as_ref().join(clip_filename(index)),
        }
    }
}

/// Terminal (or pending) state of a clip task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ClipOutcome {
    #[default]
    Pending,
    Succeeded,
    Failed(String),
}

impl ClipOutcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, ClipOutcome::Succeeded)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClipOutcome::Pending)
    }
}
