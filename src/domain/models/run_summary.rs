use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of an indexing run. A mid-run store failure leaves
/// prior writes intact and surfaces as `Aborted`; re-running is safe
/// because persistence is keyed by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "aborted",
        }
    }
}

/// A per-file failure recorded in the run summary instead of aborting
/// the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_path: String,
    pub reason: String,
}

impl FileFailure {
    pub fn new(file_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            reason: reason.into(),
        }
    }
}

/// Accounting for one full pipeline pass over a repository at a commit.
/// Every scanned file and extracted entity lands in exactly one bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub commit: String,
    pub files_scanned: u64,
    pub constructs_inserted: u64,
    pub constructs_updated: u64,
    pub constructs_unchanged: u64,
    pub imports_inserted: u64,
    pub imports_updated: u64,
    pub embeddings_failed: u64,
    pub failures: Vec<FileFailure>,
    pub status: RunStatus,
}

impl RunSummary {
    pub fn new(commit: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            commit: commit.into(),
            files_scanned: 0,
            constructs_inserted: 0,
            constructs_updated: 0,
            constructs_unchanged: 0,
            imports_inserted: 0,
            imports_updated: 0,
            embeddings_failed: 0,
            failures: Vec::new(),
            status: RunStatus::Completed,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Completed && self.failures.is_empty()
    }

    pub fn total_constructs_seen(&self) -> u64 {
        self.constructs_inserted + self.constructs_updated + self.constructs_unchanged
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} files, constructs +{} ~{} ={} | imports +{} ~{} | {} embedding failures, {} file failures",
            self.status.as_str(),
            self.files_scanned,
            self.constructs_inserted,
            self.constructs_updated,
            self.constructs_unchanged,
            self.imports_inserted,
            self.imports_updated,
            self.embeddings_failed,
            self.failures.len()
        )
    }
}
