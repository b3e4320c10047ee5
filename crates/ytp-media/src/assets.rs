//! Asset folders: transition clips, sounds and overlay resources.

use std::path::{Path, PathBuf};
use tokio::fs;

use ytp_models::AssetPool;

use crate::error::{MediaError, MediaResult};

/// Read-only view over the asset folders under one root.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    root: PathBuf,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder backing `pool`.
    pub fn pool_dir(&self, pool: AssetPool) -> PathBuf {
        self.root.join(pool.relative_dir())
    }

    /// Files in `pool` with an accepted extension, sorted by path.
    ///
    /// A missing folder counts as empty.
    pub async fn list_candidates(&self, pool: AssetPool) -> MediaResult<Vec<PathBuf>> {
        let dir = self.pool_dir(pool);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::NoAssetsFound(pool))
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && pool.accepts(&path) {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(MediaError::NoAssetsFound(pool));
        }

        files.sort();
        Ok(files)
    }
}
