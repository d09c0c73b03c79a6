//! Document corpus access for the datachat CLI.
//!
//! Provides the similarity-search side of the system: embedding providers,
//! a SQLite-backed passage index, directory ingestion, and the
//! [`PassageSearch`] boundary consumed by the answering pipelines.

pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod retriever;
pub mod types;

// Re-export main types
pub use embeddings::{create_embedder, EmbeddingProvider};
pub use ingest::ingest_documents;
pub use retriever::{PassageSearch, Retriever};
pub use types::{IndexStats, IngestOptions, IngestStats, Passage, ScoredPassage, SourceRecord};
