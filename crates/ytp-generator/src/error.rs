//! Generator error types.

use thiserror::Error;

use ytp_media::MediaError;
use ytp_models::{AssetPool, ConfigError, EffectId};

use crate::job::JobState;

pub type GenerationResult<T> = Result<T, GenerationError>;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No sources registered")]
    SourceUnavailable,

    #[error("Nothing to generate: max_clips is 0")]
    NothingToGenerate,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Job already ran (state: {0})")]
    InvalidState(JobState),

    #[error("Clip {index} could not be acquired: {source}")]
    ClipAcquisition {
        index: u32,
        #[source]
        source: MediaError,
    },

    #[error("Clip {index} failed applying {effect}: {source}")]
    Effect {
        index: u32,
        effect: EffectId,
        #[source]
        source: MediaError,
    },

    #[error("Clip {index} needs an asset from the empty {pool} pool")]
    AssetPoolEmpty { index: u32, pool: AssetPool },

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn cleanup(msg: impl Into<String>) -> Self {
        Self::Cleanup(msg.into())
    }

    /// Wrap a media failure raised while acquiring clip `index`.
    ///
    /// An empty transition pool stays a `ClipAcquisition`; `AssetPoolEmpty`
    /// is reserved for pools an effect needs.
    pub fn acquisition(index: u32, source: MediaError) -> Self {
        Self::ClipAcquisition { index, source }
    }

    /// Classify a media failure raised while applying `effect` to clip `index`.
    pub fn effect(index: u32, effect: EffectId, source: MediaError) -> Self {
        match source {
            MediaError::NoAssetsFound(pool) => Self::AssetPoolEmpty { index, pool },
            source => Self::Effect {
                index,
                effect,
                source,
            },
        }
    }

    /// Failures confined to one clip task; siblings keep running.
    pub fn is_task_local(&self) -> bool {
        matches!(
            self,
            GenerationError::ClipAcquisition { .. }
                | GenerationError::Effect { .. }
                | GenerationError::AssetPoolEmpty { .. }
        )
    }

    /// Rejections raised before any work starts.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GenerationError::SourceUnavailable
                | GenerationError::NothingToGenerate
                | GenerationError::InvalidConfig(_)
                | GenerationError::InvalidState(_)
        )
    }

    /// Index of the clip this error belongs to, if task-local.
    pub fn clip_index(&self) -> Option<u32> {
        match self {
            GenerationError::ClipAcquisition { index, .. }
            | GenerationError::Effect { index, .. }
            | GenerationError::AssetPoolEmpty { index, .. } => Some(*index),
            _ => None,
        }
    }
}
