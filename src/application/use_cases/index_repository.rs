use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::{
    ConstructStore, EmbeddingRequester, ExtractorService, VersionControl,
};
use crate::domain::{
    resolve_construct, resolve_import, ConstructKey, ContentKind, DomainError, ExtractedConstruct,
    ExtractedImport, FileFailure, ImportKey, ImportReference, Resolution, RunStatus, RunSummary,
    SourceConstruct,
};

/// One full pipeline pass: walk the tracked tree, extract constructs and
/// imports per file, resolve each against the store's identity keys,
/// embed what changed, and persist as it resolves.
///
/// Persistence is per entity, not per run: a mid-run store failure
/// leaves earlier writes intact and surfaces as an `Aborted` summary;
/// re-running is idempotent because every write is keyed by identity.
pub struct IndexRepositoryUseCase {
    version_control: Arc<dyn VersionControl>,
    extractor: Arc<dyn ExtractorService>,
    embedding_requester: Arc<EmbeddingRequester>,
    store: Arc<dyn ConstructStore>,
    extensions: Vec<String>,
    workers: usize,
}

impl IndexRepositoryUseCase {
    pub fn new(
        version_control: Arc<dyn VersionControl>,
        extractor: Arc<dyn ExtractorService>,
        embedding_requester: Arc<EmbeddingRequester>,
        store: Arc<dyn ConstructStore>,
    ) -> Self {
        Self {
            version_control,
            extractor,
            embedding_requester,
            store,
            extensions: crate::config::default_extensions(),
            workers: 8,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        if !extensions.is_empty() {
            self.extensions = extensions;
        }
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub async fn execute(
        &self,
        root: &Path,
        name: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<RunSummary, DomainError> {
        // Repository access is the one precondition checked before any
        // work; failure here aborts the run outright.
        let commit = self.version_control.current_commit(root).await?;

        let repo_name = name.map(String::from).unwrap_or_else(|| {
            root.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string()
        });

        let files = self.walk(root).await?;
        let total_files = files.len() as u64;
        info!(
            "Indexing {} at {} ({} files, {} workers)",
            repo_name,
            &commit[..commit.len().min(12)],
            total_files,
            self.workers
        );

        let start_time = Instant::now();

        let progress_bar = ProgressBar::new(total_files);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );

        let outcomes: Vec<FileOutcome> = futures_util::stream::iter(
            files.into_iter().map(|(path, kind)| {
                self.process_file(
                    root,
                    path,
                    kind,
                    &commit,
                    &repo_name,
                    cancel.clone(),
                    progress_bar.clone(),
                )
            }),
        )
        .buffer_unordered(self.workers)
        .collect()
        .await;

        progress_bar.finish_with_message("done");

        let mut summary = RunSummary::new(commit);
        for outcome in outcomes {
            if outcome.scanned {
                summary.files_scanned += 1;
            }
            summary.constructs_inserted += outcome.constructs_inserted;
            summary.constructs_updated += outcome.constructs_updated;
            summary.constructs_unchanged += outcome.constructs_unchanged;
            summary.imports_inserted += outcome.imports_inserted;
            summary.imports_updated += outcome.imports_updated;
            summary.embeddings_failed += outcome.embeddings_failed;
            if let Some(failure) = outcome.failure {
                summary.failures.push(failure);
            }
            if let Some(fatal) = outcome.fatal {
                warn!("Run aborted: {}", fatal);
                summary.status = RunStatus::Aborted;
            }
        }
        if cancel.is_cancelled() && summary.status == RunStatus::Completed {
            summary.status = RunStatus::Aborted;
        }

        info!(
            "Run {} {} in {:.2}s: {}",
            summary.run_id,
            summary.status.as_str(),
            start_time.elapsed().as_secs_f64(),
            summary
        );

        Ok(summary)
    }

    /// Tracked paths filtered to recognized content kinds. Only paths are
    /// held here; content is fetched per worker, never materialized up front.
    async fn walk(&self, root: &Path) -> Result<Vec<(String, ContentKind)>, DomainError> {
        let tracked = self.version_control.list_tracked_files(root).await?;

        let files: Vec<(String, ContentKind)> = tracked
            .into_iter()
            .filter(|path| {
                Path::new(path)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
                    .unwrap_or(false)
            })
            .filter_map(|path| {
                let kind = ContentKind::from_path(Path::new(&path));
                (kind != ContentKind::Unknown && self.extractor.supports(kind))
                    .then_some((path, kind))
            })
            .collect();

        debug!("Walker selected {} files", files.len());
        Ok(files)
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_file(
        &self,
        root: &Path,
        path: String,
        kind: ContentKind,
        commit: &str,
        repo_name: &str,
        cancel: CancellationToken,
        progress_bar: ProgressBar,
    ) -> FileOutcome {
        // Cooperative cancellation: in-flight files finish, files not yet
        // started are skipped without touching the store.
        if cancel.is_cancelled() {
            return FileOutcome::skipped();
        }

        let mut outcome = FileOutcome::scanned();
        progress_bar.set_message(path.clone());

        let content = match self.version_control.file_content(root, &path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path, e);
                outcome.failure = Some(FileFailure::new(&path, e.to_string()));
                progress_bar.inc(1);
                return outcome;
            }
        };

        let extraction = match self.extractor.extract(&content, &path, kind).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Failed to parse {}: {}", path, e);
                outcome.failure = Some(FileFailure::new(&path, e.to_string()));
                progress_bar.inc(1);
                return outcome;
            }
        };

        debug!(
            "Extracted {} constructs, {} imports from {}",
            extraction.constructs.len(),
            extraction.imports.len(),
            path
        );

        for construct in extraction.constructs {
            if let Err(e) = self
                .apply_construct(&path, commit, construct, &mut outcome)
                .await
            {
                if e.is_run_fatal() {
                    cancel.cancel();
                    outcome.fatal = Some(e);
                    progress_bar.inc(1);
                    return outcome;
                }
                warn!("Construct in {} not persisted: {}", path, e);
                outcome.failure = Some(FileFailure::new(&path, e.to_string()));
            }
        }

        // The same module can be imported more than once per file; the
        // identity key collapses them, so resolve each key once.
        let mut seen_modules = HashSet::new();
        for import in extraction.imports {
            if !seen_modules.insert(import.module_name.clone()) {
                continue;
            }
            if let Err(e) = self
                .apply_import(&path, repo_name, import, &mut outcome)
                .await
            {
                if e.is_run_fatal() {
                    cancel.cancel();
                    outcome.fatal = Some(e);
                    progress_bar.inc(1);
                    return outcome;
                }
                warn!("Import in {} not persisted: {}", path, e);
                outcome.failure = Some(FileFailure::new(&path, e.to_string()));
            }
        }

        progress_bar.inc(1);
        outcome
    }

    async fn apply_construct(
        &self,
        path: &str,
        commit: &str,
        extracted: ExtractedConstruct,
        outcome: &mut FileOutcome,
    ) -> Result<(), DomainError> {
        let key = ConstructKey::new(path, extracted.line_start, extracted.line_end);
        let existing = self.store.find_construct(&key).await?;

        let resolution = resolve_construct(existing.as_ref(), &extracted.code);
        if resolution == Resolution::NoOp {
            outcome.constructs_unchanged += 1;
            return Ok(());
        }

        let mut record = SourceConstruct::new(
            path.to_string(),
            commit.to_string(),
            extracted.kind,
            extracted.name,
            extracted.line_start,
            extracted.line_end,
            extracted.code,
        );
        if let Some(previous) = &existing {
            record = record.preserving_created_at(previous.created_at());
        }

        // Embedding is only requested for Insert/UpdateExisting; a failed
        // request never blocks persistence: the construct is stored
        // without a vector and picked up by a later run.
        match self.embedding_requester.embed(record.code()).await {
            Ok(vector) => record = record.with_embedding(vector),
            Err(e @ (DomainError::EmbeddingUnavailable(_) | DomainError::EmbeddingRejected(_))) => {
                warn!("Embedding failed for {}: {}", record.location(), e);
                outcome.embeddings_failed += 1;
            }
            Err(e) => return Err(e),
        }

        self.store.upsert_construct(&record).await?;

        match resolution {
            Resolution::Insert => outcome.constructs_inserted += 1,
            Resolution::UpdateExisting => outcome.constructs_updated += 1,
            Resolution::NoOp => unreachable!("NoOp returns early"),
        }
        Ok(())
    }

    async fn apply_import(
        &self,
        path: &str,
        repo_name: &str,
        extracted: ExtractedImport,
        outcome: &mut FileOutcome,
    ) -> Result<(), DomainError> {
        let key = ImportKey::new(path, &extracted.module_name);
        let existing = self.store.find_import(&key).await?;

        let mut record = ImportReference::new(
            path.to_string(),
            repo_name.to_string(),
            extracted.module_name,
            extracted.import_type,
        );

        match resolve_import(existing.as_ref()) {
            Resolution::Insert => {
                self.store.upsert_import(&record).await?;
                outcome.imports_inserted += 1;
            }
            Resolution::UpdateExisting => {
                if let Some(previous) = &existing {
                    record = record.preserving_created_at(previous.created_at());
                }
                self.store.upsert_import(&record).await?;
                outcome.imports_updated += 1;
            }
            Resolution::NoOp => unreachable!("imports always refresh"),
        }
        Ok(())
    }
}

/// Per-file accounting, folded into the run summary once all workers
/// finish. Keeping it per file means workers share no mutable state.
#[derive(Debug, Default)]
struct FileOutcome {
    scanned: bool,
    constructs_inserted: u64,
    constructs_updated: u64,
    constructs_unchanged: u64,
    imports_inserted: u64,
    imports_updated: u64,
    embeddings_failed: u64,
    failure: Option<FileFailure>,
    fatal: Option<DomainError>,
}

impl FileOutcome {
    fn scanned() -> Self {
        Self {
            scanned: true,
            ..Default::default()
        }
    }

    fn skipped() -> Self {
        Self::default()
    }
}
