//! Error types for the search ingest repository.

mod search_error;

pub use search_error::SearchError;
