pub mod application;
pub mod config;
pub mod connector;
pub mod domain;

pub use application::{
    ConstructStore, EmbeddingRequester, EmbeddingService, ExtractorService,
    IndexRepositoryUseCase, StatsUseCase, VersionControl,
};

pub use config::RunConfig;

pub use connector::{
    ConstructExtractor, DuckdbConstructStore, GitVersionControl, HttpEmbedding,
    InMemoryConstructStore, MockEmbedding,
};

pub use domain::{
    resolve_construct, resolve_import, split_for_embedding, ConstructKey, ConstructKind,
    ContentKind, DomainError, EmbeddingConfig, ExtractedConstruct, ExtractedImport, Extraction,
    FileFailure, ImportKey, ImportReference, ImportType, Resolution, RunStatus, RunSummary,
    SourceConstruct,
};
