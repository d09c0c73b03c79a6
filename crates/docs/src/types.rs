//! Document index type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A passage of document text stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Unique passage identifier
    pub id: String,

    /// Source document ID
    pub source_id: String,

    /// Human-readable source name (file name)
    pub source_name: String,

    /// Position within the source
    pub position: u32,

    /// Text content
    pub text: String,
}

/// A passage paired with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// A source document tracked by the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Unique source identifier
    pub id: String,

    /// Source file path
    pub path: String,

    /// SHA-256 of the file content at index time
    pub content_hash: String,

    /// When this source was indexed
    pub indexed_at: DateTime<Utc>,

    /// Number of passages created from this source
    pub chunk_count: u32,

    /// Source size in bytes
    pub byte_count: u64,
}

/// Options for the ingest operation.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Directory containing documents
    pub docs_dir: PathBuf,

    /// Maximum characters per passage
    pub chunk_size: usize,

    /// Overlap in characters between consecutive passages
    pub chunk_overlap: usize,

    /// Reset the index before ingesting
    pub reset: bool,
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of sources indexed or re-indexed
    pub sources_count: u32,

    /// Number of sources skipped (content unchanged)
    pub skipped_count: u32,

    /// Number of passages created
    pub chunks_count: u32,

    /// Total bytes processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for the passage index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of sources
    pub sources_count: u32,

    /// Number of passages
    pub passages_count: u32,
}
