//! Effect catalog identifiers and the per-run enabled set.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::pool::AssetPool;

/// Transformations that can be stacked onto a clip.
///
/// The discriminant is the effect id used by the selector; the order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectId {
    RandomSound = 0,
    RandomSoundMute = 1,
    Reverse = 2,
    SpeedUp = 3,
    SlowDown = 4,
    Chorus = 5,
    Vibrato = 6,
    HighPitch = 7,
    LowPitch = 8,
    Dance = 9,
    Squidward = 10,
    Invert = 11,
    Rainbow = 12,
    Flip = 13,
    Mirror = 14,
    Sus = 15,
    StutterLoop = 16,
    LoopFrames = 17,
    ShuffleFrames = 18,
    AudioCrust = 19,
    ImageOverlay = 20,
    MemeOverlay = 21,
    MemeSound = 22,
    ResourceSound = 23,
    OverlayVideo = 24,
    AdvertOverlay = 25,
    ErrorOverlay = 26,
    SpadinnerOverlay = 27,
    SpadinnerSound = 28,
}

impl EffectId {
    /// Number of entries in the catalog.
    pub const COUNT: usize = 29;

    /// Every effect, indexed by id.
    pub const ALL: [EffectId; Self::COUNT] = [
        EffectId::RandomSound,
        EffectId::RandomSoundMute,
        EffectId::Reverse,
        EffectId::SpeedUp,
        EffectId::SlowDown,
        EffectId::Chorus,
        EffectId::Vibrato,
        EffectId::HighPitch,
        EffectId::LowPitch,
        EffectId::Dance,
        EffectId::Squidward,
        EffectId::Invert,
        EffectId::Rainbow,
        EffectId::Flip,
        EffectId::Mirror,
        EffectId::Sus,
        EffectId::StutterLoop,
        EffectId::LoopFrames,
        EffectId::ShuffleFrames,
        EffectId::AudioCrust,
        EffectId::ImageOverlay,
        EffectId::MemeOverlay,
        EffectId::MemeSound,
        EffectId::ResourceSound,
        EffectId::OverlayVideo,
        EffectId::AdvertOverlay,
        EffectId::ErrorOverlay,
        EffectId::SpadinnerOverlay,
        EffectId::SpadinnerSound,
    ];

    /// Look up an effect by catalog index.
    pub fn from_index(index: usize) -> Option<EffectId> {
        Self::ALL.get(index).copied()
    }

    /// Catalog index of this effect.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Machine-readable key, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectId::RandomSound => "random_sound",
            EffectId::RandomSoundMute => "random_sound_mute",
            EffectId::Reverse => "reverse",
            EffectId::SpeedUp => "speed_up",
            EffectId::SlowDown => "slow_down",
            EffectId::Chorus => "chorus",
            EffectId::Vibrato => "vibrato",
            EffectId::HighPitch => "high_pitch",
            EffectId::LowPitch => "low_pitch",
            EffectId::Dance => "dance",
            EffectId::Squidward => "squidward",
            EffectId::Invert => "invert",
            EffectId::Rainbow => "rainbow",
            EffectId::Flip => "flip",
            EffectId::Mirror => "mirror",
            EffectId::Sus => "sus",
            EffectId::StutterLoop => "stutter_loop",
            EffectId::LoopFrames => "loop_frames",
            EffectId::ShuffleFrames => "shuffle_frames",
            EffectId::AudioCrust => "audio_crust",
            EffectId::ImageOverlay => "image_overlay",
            EffectId::MemeOverlay => "meme_overlay",
            EffectId::MemeSound => "meme_sound",
            EffectId::ResourceSound => "resource_sound",
            EffectId::OverlayVideo => "overlay_video",
            EffectId::AdvertOverlay => "advert_overlay",
            EffectId::ErrorOverlay => "error_overlay",
            EffectId::SpadinnerOverlay => "spadinner_overlay",
            EffectId::SpadinnerSound => "spadinner_sound",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            EffectId::RandomSound => "Random Sound",
            EffectId::RandomSoundMute => "Random Sound (Mute OG)",
            EffectId::Reverse => "Reverse Clip",
            EffectId::SpeedUp => "Speed Up",
            EffectId::SlowDown => "Slow Down",
            EffectId::Chorus => "Chorus Effect",
            EffectId::Vibrato => "Vibrato / Pitch Bend",
            EffectId::HighPitch => "High Pitch",
            EffectId::LowPitch => "Low Pitch",
            EffectId::Dance => "Dance Mode",
            EffectId::Squidward => "Squidward Mode",
            EffectId::Invert => "Invert Colors",
            EffectId::Rainbow => "Rainbow Overlay",
            EffectId::Flip => "Flip / Mirror",
            EffectId::Mirror => "Mirror Mode",
            EffectId::Sus => "Sus Effect",
            EffectId::StutterLoop => "Stutter Loop",
            EffectId::LoopFrames => "Loop Frames",
            EffectId::ShuffleFrames => "Shuffle Frames",
            EffectId::AudioCrust => "Audio Crust",
            EffectId::ImageOverlay => "Image Overlay",
            EffectId::MemeOverlay => "Meme Overlay",
            EffectId::MemeSound => "Meme Sound",
            EffectId::ResourceSound => "Resource Sound Mix",
            EffectId::OverlayVideo => "Overlay Video",
            EffectId::AdvertOverlay => "Advert Overlay",
            EffectId::ErrorOverlay => "Error/Glitch Overlay",
            EffectId::SpadinnerOverlay => "Spadinner Overlay",
            EffectId::SpadinnerSound => "Spadinner Sound",
        }
    }

    /// Asset pool this effect draws from, if any.
    pub fn required_pool(&self) -> Option<AssetPool> {
        match self {
            EffectId::RandomSound | EffectId::RandomSoundMute => Some(AssetPool::Sounds),
            EffectId::ImageOverlay => Some(AssetPool::Images),
            EffectId::MemeOverlay => Some(AssetPool::Memes),
            EffectId::MemeSound => Some(AssetPool::MemeSounds),
            EffectId::ResourceSound => Some(AssetPool::ResourceSounds),
            EffectId::OverlayVideo => Some(AssetPool::OverlayVideos),
            EffectId::AdvertOverlay => Some(AssetPool::Adverts),
            EffectId::ErrorOverlay => Some(AssetPool::Errors),
            EffectId::SpadinnerOverlay => Some(AssetPool::Spadinner),
            EffectId::SpadinnerSound => Some(AssetPool::SpadinnerSounds),
            _ => None,
        }
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EffectId {
    type Err = EffectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|effect| effect.as_str() == key)
            .ok_or_else(|| EffectParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown effect: {0}")]
pub struct EffectParseError(String);

/// Fixed-size enabled flags, one per catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectToggles([bool; EffectId::COUNT]);

impl Default for EffectToggles {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl EffectToggles {
    pub fn all_enabled() -> Self {
        Self([true; EffectId::COUNT])
    }

    pub fn none() -> Self {
        Self([false; EffectId::COUNT])
    }

    /// Enable exactly the given effects.
    pub fn only(effects: &[EffectId]) -> Self {
        let mut toggles = Self::none();
        for effect in effects {
            toggles.set(*effect, true);
        }
        toggles
    }

    pub fn set(&mut self, effect: EffectId, enabled: bool) {
        self.0[effect.index()] = enabled;
    }

    pub fn is_enabled(&self, effect: EffectId) -> bool {
        self.0[effect.index()]
    }

    /// Whether the effect at a raw catalog index is enabled. Out-of-range is `false`.
    pub fn is_index_enabled(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub fn enabled_count(&self) -> usize {
        self.0.iter().filter(|enabled| **enabled).count()
    }

    pub fn enabled(&self) -> impl Iterator<Item = EffectId> + '_ {
        EffectId::ALL
            .iter()
            .copied()
            .filter(move |effect| self.is_enabled(*effect))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl Serialize for EffectToggles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EffectToggles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flags = Vec::<bool>::deserialize(deserializer)?;
        let flags: [bool; EffectId::COUNT] = flags.try_into().map_err(|v: Vec<bool>| {
            D::Error::custom(format!(
                "expected {} effect flags, got {}",
                EffectId::COUNT,
                v.len()
            ))
        })?;
        Ok(Self(flags))
    }
}
