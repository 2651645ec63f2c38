mod embedding_requester;
mod index_repository;
mod stats;

pub use embedding_requester::*;
pub use index_repository::*;
pub use stats::*;
