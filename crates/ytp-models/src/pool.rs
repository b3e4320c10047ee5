//! Asset pool definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];
const SOUND_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv"];
const MIXED_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv", "png", "jpg"];

/// A folder of candidate files under the assets root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetPool {
    /// Transition clips copied verbatim into the output
    Transitions,
    /// Sounds mixed in by the random-sound effects
    Sounds,
    Images,
    Memes,
    MemeSounds,
    ResourceSounds,
    OverlayVideos,
    Adverts,
    Errors,
    Spadinner,
    SpadinnerSounds,
}

impl AssetPool {
    pub const ALL: &'static [AssetPool] = &[
        AssetPool::Transitions,
        AssetPool::Sounds,
        AssetPool::Images,
        AssetPool::Memes,
        AssetPool::MemeSounds,
        AssetPool::ResourceSounds,
        AssetPool::OverlayVideos,
        AssetPool::Adverts,
        AssetPool::Errors,
        AssetPool::Spadinner,
        AssetPool::SpadinnerSounds,
    ];

    /// Folder relative to the assets root.
    pub fn relative_dir(&self) -> &'static str {
        match self {
            AssetPool::Transitions => "sources",
            AssetPool::Sounds => "sounds",
            AssetPool::Images => "resources/images",
            AssetPool::Memes => "resources/memes",
            AssetPool::MemeSounds => "resources/meme_sounds",
            AssetPool::ResourceSounds => "resources/sounds",
            AssetPool::OverlayVideos => "resources/overlay_videos",
            AssetPool::Adverts => "resources/adverts",
            AssetPool::Errors => "resources/errors",
            AssetPool::Spadinner => "resources/spadinner",
            AssetPool::SpadinnerSounds => "resources/spadinner_sounds",
        }
    }

    /// Lower-case file extensions accepted from this pool.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetPool::Transitions => &["mp4"],
            AssetPool::Sounds => &["mp3"],
            AssetPool::Images | AssetPool::Memes => IMAGE_EXTENSIONS,
            AssetPool::MemeSounds | AssetPool::ResourceSounds | AssetPool::SpadinnerSounds => {
                SOUND_EXTENSIONS
            }
            AssetPool::OverlayVideos | AssetPool::Adverts => VIDEO_EXTENSIONS,
            AssetPool::Errors | AssetPool::Spadinner => MIXED_EXTENSIONS,
        }
    }

    /// Whether `path` has an extension this pool accepts.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetPool::Transitions => "transitions",
            AssetPool::Sounds => "sounds",
            AssetPool::Images => "images",
            AssetPool::Memes => "memes",
            AssetPool::MemeSounds => "meme_sounds",
            AssetPool::ResourceSounds => "resource_sounds",
            AssetPool::OverlayVideos => "overlay_videos",
            AssetPool::Adverts => "adverts",
            AssetPool::Errors => "errors",
            AssetPool::Spadinner => "spadinner",
            AssetPool::SpadinnerSounds => "spadinner_sounds",
        }
    }
}

impl fmt::Display for AssetPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a file is a still image (looped when overlaid).
pub fn is_still_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
