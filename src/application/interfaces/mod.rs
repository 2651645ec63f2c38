mod construct_store;
mod embedding_service;
mod extractor_service;
mod version_control;

pub use construct_store::*;
pub use embedding_service::*;
pub use extractor_service::*;
pub use version_control::*;
