//! Effect catalog: one FFmpeg command template per [`EffectId`].
//!
//! Effects transform a clip in place. [`WorkingClip`] owns the clip's
//! canonical path; [`WorkingClip::transform`] consumes it, moves the file to a
//! private stage path, renders the effect back onto the canonical path and
//! hands back a new owner. No two steps ever hold the same file.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use ytp_models::{is_still_image, EffectId};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Mix a random sound under the original audio.
pub const FILTER_RANDOM_SOUND: &str = concat!(
    "[0:a]channelsplit=channel_layout=stereo[a1][a2];",
    "[1:a]volume=1,apad,channelsplit=channel_layout=stereo[a3][a4];",
    "[a1][a2][a3][a4]amerge=inputs=4,pan=stereo|c0<c0+c2|c1<c1+c3[out]"
);

/// Replace the original audio with a random sound.
pub const FILTER_RANDOM_SOUND_MUTE: &str = "[1:a]volume=1,apad[aud]";

/// Freeze the last frame briefly while the audio stutters.
pub const FILTER_STUTTER_LOOP: &str =
    "[0:v]tpad=stop_mode=clone:stop_duration=0.1[v];[0:a]aloop=loop=3:size=4410[a]";

/// Shrink an overlay to 30% and pin it 20px from the bottom-right corner.
pub const FILTER_VISUAL_OVERLAY: &str =
    "[1:v]scale=iw*0.3:ih*0.3[ov];[0:v][ov]overlay=W-w-20:H-h-20:shortest=1[vout]";

/// Mix an overlay sound with the original audio.
pub const FILTER_AUDIO_OVERLAY: &str = "[0:a][1:a]amix=inputs=2:duration=shortest[aout]";

/// Whether a visual overlay input should be looped.
fn loop_overlay(effect: EffectId, asset: &Path) -> bool {
    match effect {
        EffectId::ImageOverlay | EffectId::MemeOverlay => true,
        EffectId::ErrorOverlay | EffectId::SpadinnerOverlay => is_still_image(asset),
        _ => false,
    }
}

fn require_asset(effect: EffectId, asset: Option<&Path>) -> MediaResult<&Path> {
    match (effect.required_pool(), asset) {
        (_, Some(asset)) => Ok(asset),
        (Some(pool), None) => Err(MediaError::NoAssetsFound(pool)),
        (None, None) => Err(MediaError::InvalidVideo(format!(
            "effect {} takes no asset",
            effect
        ))),
    }
}

/// Build the command rendering `effect` from `input` onto `output`.
///
/// `asset` is the file drawn from the effect's pool, if it has one.
pub fn effect_command(
    effect: EffectId,
    input: &Path,
    output: &Path,
    asset: Option<&Path>,
) -> MediaResult<FfmpegCommand> {
    let base = FfmpegCommand::new(input, output).log_level("warning");

    let cmd = match effect {
        EffectId::RandomSound => base
            .add_input(require_asset(effect, asset)?)
            .filter_complex(FILTER_RANDOM_SOUND)
            .audio_channels(2)
            .map("0:v")
            .map("[out]")
            .shortest(),
        EffectId::RandomSoundMute => base
            .add_input(require_asset(effect, asset)?)
            .filter_complex(FILTER_RANDOM_SOUND_MUTE)
            .map("0:v")
            .map("[aud]")
            .shortest(),
        EffectId::Reverse => base.video_filter("reverse").audio_filter("areverse"),
        EffectId::SpeedUp => base.video_filter("setpts=0.5*PTS").audio_filter("atempo=2.0"),
        EffectId::SlowDown => base.video_filter("setpts=2*PTS").audio_filter("atempo=0.5"),
        EffectId::Chorus => base.audio_filter("aecho=0.8:0.88:60:0.4"),
        EffectId::Vibrato => base.audio_filter("vibrato=f=6.5"),
        EffectId::HighPitch => base
            .video_filter("setpts=0.5*PTS")
            .audio_filter("asetrate=44100*2,aresample=44100"),
        EffectId::LowPitch => base
            .video_filter("setpts=2*PTS")
            .audio_filter("asetrate=44100*0.5,aresample=44100"),
        EffectId::Dance => base.video_filter("scale=iw*1.1:ih*1.1,eq=contrast=1.2"),
        EffectId::Squidward => base.video_filter("hue=s=0,eq=brightness=0.05"),
        EffectId::Invert => base.video_filter("negate"),
        EffectId::Rainbow => base.video_filter("hue=H=2*PI*t"),
        EffectId::Flip => base.video_filter("hflip"),
        EffectId::Mirror => base.video_filter("split[l][r];[l]hflip[lf];[lf][r]hstack"),
        EffectId::Sus => base.audio_filter("asetrate=44100*1.15,atempo=0.9"),
        EffectId::StutterLoop => base
            .filter_complex(FILTER_STUTTER_LOOP)
            .map("[v]")
            .map("[a]"),
        EffectId::LoopFrames => base.video_filter("loop=loop=2:size=30:start=0"),
        EffectId::ShuffleFrames => base.video_filter("shuffleframes=0:1:2:3"),
        EffectId::AudioCrust => base.audio_filter("volume=8,highpass=f=200,lowpass=f=3000"),
        EffectId::ImageOverlay
        | EffectId::MemeOverlay
        | EffectId::OverlayVideo
        | EffectId::AdvertOverlay
        | EffectId::ErrorOverlay
        | EffectId::SpadinnerOverlay => {
            let overlay = require_asset(effect, asset)?;
            let cmd = if loop_overlay(effect, overlay) {
                base.add_input(overlay).loop_input()
            } else {
                base.add_input(overlay)
            };
            cmd.filter_complex(FILTER_VISUAL_OVERLAY)
                .map("[vout]")
                .map("0:a?")
        }
        EffectId::MemeSound | EffectId::ResourceSound | EffectId::SpadinnerSound => base
            .add_input(require_asset(effect, asset)?)
            .filter_complex(FILTER_AUDIO_OVERLAY)
            .map("0:v")
            .map("[aout]")
            .shortest(),
    };

    Ok(cmd)
}

/// Exclusive owner of a clip file at its canonical path.
#[derive(Debug, PartialEq, Eq)]
pub struct WorkingClip {
    path: PathBuf,
}

impl WorkingClip {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Private file the clip is moved to while an effect reads it.
    pub fn stage_path(&self) -> PathBuf {
        self.path.with_extension("stage.mp4")
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// Apply `effect`, consuming this owner and returning the next one.
    ///
    /// The stage file is removed whether or not the effect succeeds.
    pub async fn transform(
        self,
        runner: &FfmpegRunner,
        effect: EffectId,
        asset: Option<&Path>,
    ) -> MediaResult<WorkingClip> {
        let stage = self.stage_path();
        let cmd = effect_command(effect, &stage, &self.path, asset)?;

        fs::rename(&self.path, &stage).await?;
        debug!("Applying effect {} to {}", effect, self.path.display());

        let result = runner.run(&cmd).await;

        if let Err(e) = fs::remove_file(&stage).await {
            debug!("Failed to remove stage file {}: {}", stage.display(), e);
        }

        result?;
        metrics::counter!("ytp_effects_applied_total", "effect" => effect.as_str()).increment(1);
        Ok(WorkingClip { path: self.path })
    }
}
