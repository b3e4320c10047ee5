//! Final concatenation of the manifest into the output file.

use std::path::{Path, PathBuf};
use tracing::info;

use ytp_media::{move_file, MediaToolkit};

use crate::error::{GenerationError, GenerationResult};
use crate::manifest::Manifest;

/// Name of the concatenated file inside the work directory.
const ASSEMBLED_FILENAME: &str = "assembled.mp4";

/// Drives the concat primitive over a manifest.
pub struct Assembler<'a> {
    toolkit: &'a dyn MediaToolkit,
    work_dir: &'a Path,
}

impl<'a> Assembler<'a> {
    pub fn new(toolkit: &'a dyn MediaToolkit, work_dir: &'a Path) -> Self {
        Self { toolkit, work_dir }
    }

    /// Concatenate inside the work directory, then publish to `output`.
    ///
    /// The toolkit guarantees the result carries an audio stream. An empty
    /// manifest is an assembly failure.
    pub async fn assemble(&self, manifest: &Manifest, output: &Path) -> GenerationResult<()> {
        if manifest.is_empty() {
            return Err(GenerationError::assembly("no clips to concatenate"));
        }

        let assembled = self.assembled_path();
        self.toolkit
            .concatenate(&manifest.paths(), &assembled)
            .await
            .map_err(|e| GenerationError::assembly(e.to_string()))?;

        move_file(&assembled, output).await.map_err(|e| {
            GenerationError::assembly(format!("could not publish {}: {}", output.display(), e))
        })?;

        info!(
            clips = manifest.len(),
            output = %output.display(),
            "Assembled output"
        );
        Ok(())
    }

    fn assembled_path(&self) -> PathBuf {
        self.work_dir.join(ASSEMBLED_FILENAME)
    }
}
