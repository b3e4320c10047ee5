//! Per-run generation settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effect::EffectToggles;

/// Default number of clips per run
pub const DEFAULT_MAX_CLIPS: u32 = 20;
/// Default shortest snippet, in seconds
pub const DEFAULT_MIN_CLIP_DURATION: f64 = 0.2;
/// Default longest snippet, in seconds
pub const DEFAULT_MAX_CLIP_DURATION: f64 = 0.4;
/// Default 1-in-N chance of a transition clip
pub const DEFAULT_TRANSITION_PROBABILITY: u32 = 15;
/// Default percent chance of stacking effects onto a clip
pub const DEFAULT_EFFECT_PROBABILITY: u32 = 30;
/// Default ceiling on stacked effects
pub const DEFAULT_MAX_STACK_LEVEL: u32 = 3;

/// Settings for one generation run. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of clip tasks to spawn
    pub max_clips: u32,

    /// Shortest snippet extracted from a source, in seconds
    pub min_clip_duration: f64,

    /// Longest snippet extracted from a source, in seconds
    pub max_clip_duration: f64,

    /// Whether transition clips may replace snippets
    pub insert_transition_clips: bool,

    /// A clip is a transition with probability `1 / transition_probability`
    pub transition_probability: u32,

    /// Percent chance (0-100) that a clip gets an effect stack
    pub effect_probability: u32,

    /// Allow more than one effect per clip
    pub allow_effect_stacking: bool,

    /// Maximum effects stacked onto one clip
    pub max_stack_level: u32,

    /// Enabled flags, indexed by effect id
    pub effects: EffectToggles,

    /// Seed for reproducible runs; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_clips: DEFAULT_MAX_CLIPS,
            min_clip_duration: DEFAULT_MIN_CLIP_DURATION,
            max_clip_duration: DEFAULT_MAX_CLIP_DURATION,
            insert_transition_clips: true,
            transition_probability: DEFAULT_TRANSITION_PROBABILITY,
            effect_probability: DEFAULT_EFFECT_PROBABILITY,
            allow_effect_stacking: true,
            max_stack_level: DEFAULT_MAX_STACK_LEVEL,
            effects: EffectToggles::all_enabled(),
            seed: None,
        }
    }
}

impl GenerationConfig {
    /// Check the invariants the selector and task runner rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_clip_duration, self.max_clip_duration);
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(ConfigError::InvalidDuration { min, max });
        }
        if min > max {
            return Err(ConfigError::InvertedDuration { min, max });
        }
        if !(1..=100).contains(&self.transition_probability) {
            return Err(ConfigError::TransitionProbability(self.transition_probability));
        }
        if self.effect_probability > 100 {
            return Err(ConfigError::EffectProbability(self.effect_probability));
        }
        if self.max_stack_level < 1 {
            return Err(ConfigError::StackLevel);
        }
        Ok(())
    }

    /// Number of enabled effects.
    pub fn enabled_effect_count(&self) -> usize {
        self.effects.enabled_count()
    }

    /// Upper bound on the effects a single plan may contain.
    pub fn stack_ceiling(&self) -> usize {
        let ceiling = if self.allow_effect_stacking {
            self.max_stack_level as usize
        } else {
            1
        };
        ceiling.min(self.enabled_effect_count())
    }

    /// Progress units for a run: one per clip plus one for concatenation.
    pub fn progress_units(&self) -> u64 {
        u64::from(self.max_clips) + 1
    }
}

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Clip durations must be finite and non-negative (min {min}, max {max})")]
    InvalidDuration { min: f64, max: f64 },

    #[error("Minimum clip duration {min} exceeds maximum {max}")]
    InvertedDuration { min: f64, max: f64 },

    #[error("Transition probability must be between 1 and 100, got {0}")]
    TransitionProbability(u32),

    #[error("Effect probability must be between 0 and 100, got {0}")]
    EffectProbability(u32),

    #[error("Maximum stack level must be at least 1")]
    StackLevel,
}
