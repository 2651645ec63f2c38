mod construct;
mod content_kind;
mod embedding;
mod extraction;
mod import_reference;
mod run_summary;

pub use construct::*;
pub use content_kind::*;
pub use embedding::*;
pub use extraction::*;
pub use import_reference::*;
pub use run_summary::*;
