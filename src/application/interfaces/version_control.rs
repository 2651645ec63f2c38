use std::path::Path;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Narrow contract over the version-control system. The core never shells
/// out in its own logic beyond this port.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// All paths currently tracked by version control, relative to `root`,
    /// lexicographically sorted and deduplicated. An empty list is valid.
    ///
    /// Fails with [`DomainError::NotARepository`] when `root` is not
    /// inside a working tree.
    async fn list_tracked_files(&self, root: &Path) -> Result<Vec<String>, DomainError>;

    /// Identifier of the revision the working tree is currently at.
    async fn current_commit(&self, root: &Path) -> Result<String, DomainError>;

    /// Content of one tracked file at the current revision.
    async fn file_content(&self, root: &Path, path: &str) -> Result<String, DomainError>;
}
