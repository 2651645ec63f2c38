mod construct_extractor;
mod duckdb_construct_store;
mod git_version_control;
mod http_embedding;
mod in_memory_construct_store;
mod mock_embedding;

pub use construct_extractor::*;
pub use duckdb_construct_store::*;
pub use git_version_control::*;
pub use http_embedding::*;
pub use in_memory_construct_store::*;
pub use mock_embedding::*;
