//! # Search Ingest Repository
//!
//! This crate provides the search engine abstraction used by the ingest
//! pipeline. It includes definitions for errors, the `SearchEngineClient`
//! interface with an OpenSearch and an in-memory implementation, and the
//! `IndexLifecycleManager`, which keeps two physical generations per logical
//! index and swaps the published alias between them.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod lifecycle;
pub mod memory;
pub mod opensearch;
pub mod types;

pub use config::OpenSearchConfig;
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use lifecycle::{IndexGroup, IndexLifecycleManager, PublishStats};
pub use memory::InMemorySearchEngine;
pub use opensearch::OpenSearchClient;
pub use types::{AliasAction, BulkSummary};
