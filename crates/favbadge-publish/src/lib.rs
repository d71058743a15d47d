mod git;
mod patch;

use std::fs;
use std::path::{Path, PathBuf};

use favbadge_badge::badge_markup;
use favbadge_core::{FavError, FavResult, RepositoryTarget};
use tracing::{info, warn};

pub use git::{GitCli, VersionControl};
pub use patch::{INSERTION_MARKER, patch_document, patch_file};

pub const COMMIT_MESSAGE: &str = "feat: updated favorite_music_badge";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Committed,
    Unchanged,
}

/// A clone directory owned by the current run, removed when dropped.
struct WorkingCopy {
    path: PathBuf,
}

impl WorkingCopy {
    fn claim(path: &Path) -> FavResult<Self> {
        if path.exists() {
            return Err(FavError::VersionControl(format!(
                "scratch directory {} already exists, remove it or pick another one",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => info!("removed {}", self.path.display()),
            Err(err) => warn!("failed to remove {}: {err}", self.path.display()),
        }
    }
}

pub struct Publisher<V> {
    vcs: V,
}

impl<V: VersionControl> Publisher<V> {
    pub fn new(vcs: V) -> Self {
        Self { vcs }
    }

    /// Writes the badge into the target document and pushes it if anything changed.
    pub async fn publish(
        &self,
        target: &RepositoryTarget,
        badge_url: &str,
        track_link: &str,
    ) -> FavResult<PublishOutcome> {
        let working_copy = WorkingCopy::claim(&target.scratch_dir)?;
        info!(
            "cloning {} into {}",
            target.remote_url,
            working_copy.path().display()
        );
        self.vcs
            .clone_repo(&target.remote_url, working_copy.path())
            .await?;

        let document = working_copy.path().join(&target.file_path);
        patch_file(&document, &badge_markup(badge_url, track_link)).await?;

        self.vcs.add(working_copy.path(), &target.file_path).await?;
        if !self.vcs.has_staged_changes(working_copy.path()).await? {
            info!("nothing has changed, same favorite music; not updating the repository");
            return Ok(PublishOutcome::Unchanged);
        }

        self.vcs.commit(working_copy.path(), COMMIT_MESSAGE).await?;
        self.vcs.push(working_copy.path()).await?;
        info!("pushed the new favorite music badge to {}", target.remote_url);
        Ok(PublishOutcome::Committed)
    }
}
