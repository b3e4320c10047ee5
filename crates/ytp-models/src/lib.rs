//! Shared data models for the YTP clip-assembly pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Generation settings
//! - The effect catalog and enabled-effect flags
//! - Asset pools
//! - Clip tasks and effect plans

pub mod clip;
pub mod config;
pub mod effect;
pub mod plan;
pub mod pool;

// Re-export common types
pub use clip::{clip_filename, ClipOutcome, ClipTask};
pub use config::{ConfigError, GenerationConfig};
pub use effect::{EffectId, EffectParseError, EffectToggles};
pub use plan::{ClipKind, EffectPlan};
pub use pool::{is_still_image, AssetPool};
