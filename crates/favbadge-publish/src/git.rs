use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use favbadge_core::{FavError, FavResult};
use tokio::process::Command;
use tracing::debug;

/// The version-control operations the publisher relies on.
#[async_trait]
pub trait VersionControl: Send + Sync {
    async fn clone_repo(&self, remote: &str, dest: &Path) -> FavResult<()>;

    async fn add(&self, repo: &Path, file: &Path) -> FavResult<()>;

    /// Whether the index differs from `HEAD`.
    async fn has_staged_changes(&self, repo: &Path) -> FavResult<bool>;

    async fn commit(&self, repo: &Path, message: &str) -> FavResult<()>;

    async fn push(&self, repo: &Path) -> FavResult<()>;
}

/// Shells out to the `git` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn output<I, S>(&self, repo: Option<&Path>, args: I) -> FavResult<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        if let Some(repo) = repo {
            command.arg("-C").arg(repo);
        }
        command.args(args);
        debug!(?command, "running git");
        command
            .output()
            .await
            .map_err(|err| FavError::VersionControl(format!("failed to run {}: {err}", self.program)))
    }

    async fn run<I, S>(&self, repo: Option<&Path>, operation: &str, args: I) -> FavResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(repo, args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("git {operation}: {}", stdout.trim());
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FavError::VersionControl(format!(
                "git {operation} failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn clone_repo(&self, remote: &str, dest: &Path) -> FavResult<()> {
        self.run(
            None,
            "clone",
            [OsStr::new("clone"), OsStr::new(remote), dest.as_os_str()],
        )
        .await
    }

    async fn add(&self, repo: &Path, file: &Path) -> FavResult<()> {
        self.run(Some(repo), "add", [OsStr::new("add"), file.as_os_str()])
            .await
    }

    async fn has_staged_changes(&self, repo: &Path) -> FavResult<bool> {
        let output = self
            .output(
                Some(repo),
                ["diff-index", "--quiet", "--cached", "HEAD", "--"],
            )
            .await?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(FavError::VersionControl(format!(
                "git diff-index failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    async fn commit(&self, repo: &Path, message: &str) -> FavResult<()> {
        self.run(Some(repo), "commit", ["commit", "-m", message])
            .await
    }

    async fn push(&self, repo: &Path) -> FavResult<()> {
        self.run(Some(repo), "push", ["push"]).await
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::process::Command as StdCommand;

    use super::*;

    fn git_available() -> bool {
        StdCommand::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("favbadge-git-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn git_setup(repo: &Path, args: &[&str]) {
        let status = StdCommand::new("git")
            .arg("-C")
            .arg(repo)
            .args(args)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?}");
    }

    /// A repository with one committed README and a local identity.
    fn init_repo(dir: &Path) {
        git_setup(dir, &["init", "--quiet"]);
        git_setup(dir, &["config", "user.name", "favbadge"]);
        git_setup(dir, &["config", "user.email", "favbadge@example.com"]);
        git_setup(dir, &["config", "commit.gpgsign", "false"]);
        std::fs::write(dir.join("README.md"), "# me\n").unwrap();
        git_setup(dir, &["add", "README.md"]);
        git_setup(dir, &["commit", "--quiet", "-m", "init"]);
    }

    #[tokio::test]
    async fn staged_changes_follow_diff_index_exit_code() {
        if !git_available() {
            return;
        }
        let repo = scratch("staged");
        init_repo(&repo);
        let git = GitCli::default();
        let readme = Path::new("README.md");

        git.add(&repo, readme).await.unwrap();
        assert!(!git.has_staged_changes(&repo).await.unwrap());

        std::fs::write(repo.join("README.md"), "# me\nbadge\n").unwrap();
        git.add(&repo, readme).await.unwrap();
        assert!(git.has_staged_changes(&repo).await.unwrap());

        git.commit(&repo, "update").await.unwrap();
        assert!(!git.has_staged_changes(&repo).await.unwrap());

        std::fs::remove_dir_all(&repo).unwrap();
    }

    #[tokio::test]
    async fn diff_index_outside_a_repository_is_an_error() {
        if !git_available() {
            return;
        }
        let dir = scratch("plain");
        let result = GitCli::default().has_staged_changes(&dir).await;
        assert!(matches!(result, Err(FavError::VersionControl(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn clone_copies_a_local_remote() {
        if !git_available() {
            return;
        }
        let origin = scratch("origin");
        init_repo(&origin);
        let parent = scratch("clone");
        let dest = parent.join("work");

        GitCli::default()
            .clone_repo(&origin.to_string_lossy(), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("README.md")).unwrap(), "# me\n");
        std::fs::remove_dir_all(&origin).unwrap();
        std::fs::remove_dir_all(&parent).unwrap();
    }

    #[tokio::test]
    async fn missing_executable_is_version_control_error() {
        let git = GitCli::new("favbadge-no-such-git");
        let result = git.push(Path::new(".")).await;
        match result {
            Err(FavError::VersionControl(msg)) => assert!(msg.contains("favbadge-no-such-git")),
            other => panic!("Expected VersionControl error, got {other:?}"),
        }
    }
}
