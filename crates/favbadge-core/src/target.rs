use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SCRATCH_DIR: &str = "./repository_to_modify";

/// The repository and file a badge gets published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTarget {
    pub remote_url: String,
    /// Path of the document, relative to the repository root.
    pub file_path: PathBuf,
    /// Where the throwaway clone lives for the duration of one run.
    pub scratch_dir: PathBuf,
}

impl RepositoryTarget {
    pub fn new(remote_url: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            remote_url: remote_url.into(),
            file_path: file_path.into(),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
        }
    }

    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }
}
