//! Ordered list of the clips that made it to disk.

use std::path::{Path, PathBuf};
use tokio::fs;

use ytp_models::{ClipOutcome, ClipTask};

/// Surviving clips, ascending by task index.
///
/// Built once after every task has finished and consumed once by assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(u32, PathBuf)>,
}

impl Manifest {
    /// Keep succeeded tasks whose file exists, sorted by index.
    ///
    /// `results` may arrive in any order; completion order never leaks into
    /// the manifest.
    pub async fn from_tasks<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = (&'a ClipTask, &'a ClipOutcome)>,
    {
        let succeeded: Vec<&ClipTask> = results
            .into_iter()
            .filter(|(_, outcome)| outcome.is_succeeded())
            .map(|(task, _)| task)
            .collect();

        let mut entries = Vec::with_capacity(succeeded.len());
        for task in succeeded {
            if is_file(&task.path).await {
                entries.push((task.index, task.path.clone()));
            }
        }
        entries.sort_by_key(|(index, _)| *index);
        entries.dedup_by_key(|(index, _)| *index);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Task indices in manifest order.
    pub fn indices(&self) -> Vec<u32> {
        self.entries.iter().map(|(index, _)| *index).collect()
    }

    /// Clip paths in manifest order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|(_, path)| path.clone()).collect()
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sorted_by_index_not_by_arrival() {
        let dir = TempDir::new().unwrap();
        let tasks: Vec<ClipTask> = [3, 0, 2, 1]
            .into_iter()
            .map(|i| ClipTask::new(dir.path(), i))
            .collect();
        for task in &tasks {
            std::fs::write(&task.path, b"clip").unwrap();
        }
        let outcomes = vec![ClipOutcome::Succeeded; tasks.len()];

        let manifest = Manifest::from_tasks(tasks.iter().zip(&outcomes)).await;

        assert_eq!(manifest.indices(), vec![0, 1, 2, 3]);
        assert_eq!(manifest.paths()[0], dir.path().join("video0.mp4"));
    }

    #[tokio::test]
    async fn test_skips_failed_and_missing_clips() {
        let dir = TempDir::new().unwrap();
        let tasks: Vec<ClipTask> = (0..4).map(|i| ClipTask::new(dir.path(), i)).collect();
        // clip 1 failed but left a file; clip 3 succeeded but has no file
        for i in [0, 1, 2] {
            std::fs::write(&tasks[i].path, b"clip").unwrap();
        }
        let outcomes = vec![
            ClipOutcome::Succeeded,
            ClipOutcome::Failed("boom".to_string()),
            ClipOutcome::Succeeded,
            ClipOutcome::Succeeded,
        ];

        let manifest = Manifest::from_tasks(tasks.iter().zip(&outcomes)).await;

        assert_eq!(manifest.indices(), vec![0, 2]);
        assert_eq!(manifest.len(), 2);
    }

    #[tokio::test]
    async fn test_directory_at_clip_path_is_skipped() {
        let dir = TempDir::new().unwrap();
        let tasks: Vec<ClipTask> = (0..2).map(|i| ClipTask::new(dir.path(), i)).collect();
        std::fs::write(&tasks[0].path, b"clip").unwrap();
        std::fs::create_dir(&tasks[1].path).unwrap();
        let outcomes = vec![ClipOutcome::Succeeded; 2];

        let manifest = Manifest::from_tasks(tasks.iter().zip(&outcomes)).await;

        assert_eq!(manifest.indices(), vec![0]);
    }

    #[tokio::test]
    async fn test_empty_manifest() {
        let manifest = Manifest::from_tasks(std::iter::empty()).await;
        assert!(manifest.is_empty());
        assert!(manifest.paths().is_empty());
    }
}
