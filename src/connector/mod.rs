//! # Connector Layer
//!
//! External integrations implementing the application ports:
//! - Version control (git binary)
//! - Extraction (tree-sitter for source, line scan for prose)
//! - Embedding generation (HTTP service, deterministic mock)
//! - Storage (DuckDB, in-memory)

pub mod adapter;

pub use adapter::*;
