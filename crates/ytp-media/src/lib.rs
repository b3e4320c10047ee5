#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the YTP clip-assembly pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and running
//! - Duration and stream probing via FFprobe
//! - Range extraction, verbatim copies and concat-demuxer assembly
//! - The effect catalog as FFmpeg command templates
//! - Asset pool listing
//! - The [`MediaToolkit`] trait the pipeline calls through

pub mod assets;
pub mod clip;
pub mod command;
pub mod concat;
pub mod effects;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod toolkit;

pub use assets::AssetLibrary;
pub use clip::{copy_clip, extract_range};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use concat::{concat_clips, ensure_audio_track};
pub use effects::{effect_command, WorkingClip};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{move_file, remove_if_exists};
pub use probe::{has_audio_stream, probe_duration, probe_media, MediaInfo};
pub use toolkit::{FfmpegToolkit, MediaToolkit};
