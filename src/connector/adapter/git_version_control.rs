use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::application::VersionControl;
use crate::domain::DomainError;

/// Version-control collaborator backed by the `git` binary.
///
/// All repository access funnels through here: `git ls-files` for the
/// tracked set, `git rev-parse HEAD` for the current revision, and
/// working-tree reads for file content. Nothing else in the crate shells
/// out.
pub struct GitVersionControl;

impl GitVersionControl {
    pub fn new() -> Self {
        Self
    }

    async fn run_git(&self, root: &Path, args: &[&str]) -> Result<String, GitFailure> {
        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(args)
            .output()
            .await
            .map_err(|e| GitFailure::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("not a git repository") {
                return Err(GitFailure::NotARepository);
            }
            return Err(GitFailure::Command(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for GitVersionControl {
    fn default() -> Self {
        Self::new()
    }
}

enum GitFailure {
    NotARepository,
    Spawn(String),
    Command(String),
}

impl GitFailure {
    fn into_domain(self, root: &Path, context: &str) -> DomainError {
        match self {
            GitFailure::NotARepository => {
                DomainError::not_a_repository(root.display().to_string())
            }
            GitFailure::Spawn(msg) => {
                DomainError::internal(format!("Failed to invoke git: {}", msg))
            }
            GitFailure::Command(msg) => {
                DomainError::invalid_input(format!("{}: {}", context, msg))
            }
        }
    }
}

#[async_trait]
impl VersionControl for GitVersionControl {
    async fn list_tracked_files(&self, root: &Path) -> Result<Vec<String>, DomainError> {
        let stdout = self
            .run_git(root, &["ls-files"])
            .await
            .map_err(|e| e.into_domain(root, "git ls-files failed"))?;

        let mut files: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        files.sort();
        files.dedup();

        debug!("git tracks {} files under {}", files.len(), root.display());
        Ok(files)
    }

    async fn current_commit(&self, root: &Path) -> Result<String, DomainError> {
        match self.run_git(root, &["rev-parse", "HEAD"]).await {
            Ok(stdout) => Ok(stdout.trim().to_string()),
            Err(GitFailure::NotARepository) => {
                Err(DomainError::not_a_repository(root.display().to_string()))
            }
            Err(GitFailure::Command(msg))
                if msg.contains("unknown revision") || msg.contains("ambiguous argument") =>
            {
                // Repository exists but has no commits yet.
                warn!("Could not resolve HEAD under {}: {}", root.display(), msg);
                Ok("HEAD".to_string())
            }
            Err(e) => Err(e.into_domain(root, "git rev-parse failed")),
        }
    }

    async fn file_content(&self, root: &Path, path: &str) -> Result<String, DomainError> {
        let bytes = tokio::fs::read(root.join(path)).await?;
        String::from_utf8(bytes)
            .map_err(|_| DomainError::parse(format!("{} is not valid UTF-8", path)))
    }
}
