//! Document ingestion.
//!
//! Walks a documents directory, splits text files into overlapping chunks,
//! embeds them, and stores the passages in the index. Re-ingesting a source
//! whose content hash is unchanged is a no-op; a changed source has its
//! passages replaced.

use crate::embeddings::EmbeddingProvider;
use crate::index;
use crate::types::{IngestOptions, IngestStats, Passage, SourceRecord};
use chrono::Utc;
use datachat_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use text_splitter::{ChunkConfig, TextSplitter};
use uuid::Uuid;

/// File extensions treated as ingestible documents.
const DOC_EXTENSIONS: &[&str] = &["txt", "md"];

/// Ingest all documents under `options.docs_dir` into the index at
/// `index_path`.
pub async fn ingest_documents(
    index_path: &Path,
    options: &IngestOptions,
    embedder: &Arc<dyn EmbeddingProvider>,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    if !options.docs_dir.is_dir() {
        return Err(AppError::Docs(format!(
            "Documents directory not found: {:?}",
            options.docs_dir
        )));
    }

    let conn = index::open_index(index_path)?;

    if options.reset {
        index::reset_index(&conn)?;
    }

    let chunk_config = ChunkConfig::new(options.chunk_size)
        .with_overlap(options.chunk_overlap)
        .map_err(|e| AppError::Docs(format!("Invalid chunk configuration: {}", e)))?;
    let splitter = TextSplitter::new(chunk_config);

    let mut stats = IngestStats::default();

    for entry in walkdir::WalkDir::new(&options.docs_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();

        let is_doc = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| DOC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !is_doc {
            continue;
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping unreadable file {:?}: {}", path, e);
                continue;
            }
        };

        let path_str = path.to_string_lossy().into_owned();
        let content_hash = format!("{:x}", Sha256::digest(text.as_bytes()));

        // Unchanged content keeps its existing passages
        let existing = index::find_source(&conn, &path_str)?;
        if let Some(ref record) = existing {
            if record.content_hash == content_hash {
                tracing::debug!("Skipping unchanged source {:?}", path);
                stats.skipped_count += 1;
                continue;
            }
        }

        let source_id = existing
            .map(|record| record.id)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        index::delete_passages_for(&conn, &source_id)?;

        let chunks: Vec<String> = splitter.chunks(&text).map(|c| c.to_string()).collect();
        if chunks.is_empty() {
            tracing::debug!("No content in {:?}", path);
            continue;
        }

        let embeddings = embedder.embed_batch(&chunks).await?;

        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.clone());

        for (position, (chunk, embedding)) in chunks.iter().zip(embeddings.iter()).enumerate() {
            let passage = Passage {
                id: Uuid::new_v4().to_string(),
                source_id: source_id.clone(),
                source_name: source_name.clone(),
                position: position as u32,
                text: chunk.clone(),
            };
            index::insert_passage(&conn, &passage, embedding)?;
        }

        index::upsert_source(
            &conn,
            &SourceRecord {
                id: source_id,
                path: path_str,
                content_hash,
                indexed_at: Utc::now(),
                chunk_count: chunks.len() as u32,
                byte_count: text.len() as u64,
            },
        )?;

        tracing::info!("Indexed {:?} ({} passages)", path, chunks.len());

        stats.sources_count += 1;
        stats.chunks_count += chunks.len() as u32;
        stats.bytes_processed += text.len() as u64;
    }

    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Ingest complete: {} sources, {} passages, {} skipped in {:.2}s",
        stats.sources_count,
        stats.chunks_count,
        stats.skipped_count,
        stats.duration_secs
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::trigram::TrigramProvider;
    use tempfile::TempDir;

    fn setup() -> (TempDir, IngestOptions, Arc<dyn EmbeddingProvider>) {
        let temp = TempDir::new().unwrap();
        let docs_dir = temp.path().join("docs");
        std::fs::create_dir_all(&docs_dir).unwrap();

        let options = IngestOptions {
            docs_dir,
            chunk_size: 200,
            chunk_overlap: 20,
            reset: false,
        };

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TrigramProvider::new(64));
        (temp, options, embedder)
    }

    #[tokio::test]
    async fn test_ingest_creates_passages() {
        let (temp, options, embedder) = setup();
        std::fs::write(
            options.docs_dir.join("report.txt"),
            "Total revenue in 2023 was 4.2 million dollars. Electronics led all categories.",
        )
        .unwrap();
        std::fs::write(options.docs_dir.join("ignored.bin"), "binary").unwrap();

        let index_path = temp.path().join("index.db");
        let stats = ingest_documents(&index_path, &options, &embedder)
            .await
            .unwrap();

        assert_eq!(stats.sources_count, 1);
        assert!(stats.chunks_count >= 1);
        assert_eq!(stats.skipped_count, 0);
    }

    #[tokio::test]
    async fn test_reingest_skips_unchanged() {
        let (temp, options, embedder) = setup();
        std::fs::write(options.docs_dir.join("plan.md"), "Strategic plan for 2024.").unwrap();

        let index_path = temp.path().join("index.db");
        ingest_documents(&index_path, &options, &embedder)
            .await
            .unwrap();

        let stats = ingest_documents(&index_path, &options, &embedder)
            .await
            .unwrap();
        assert_eq!(stats.sources_count, 0);
        assert_eq!(stats.skipped_count, 1);
    }

    #[tokio::test]
    async fn test_reingest_replaces_changed_source() {
        let (temp, options, embedder) = setup();
        let file = options.docs_dir.join("plan.md");
        std::fs::write(&file, "First version.").unwrap();

        let index_path = temp.path().join("index.db");
        ingest_documents(&index_path, &options, &embedder)
            .await
            .unwrap();

        std::fs::write(&file, "Second version with different content.").unwrap();
        let stats = ingest_documents(&index_path, &options, &embedder)
            .await
            .unwrap();
        assert_eq!(stats.sources_count, 1);

        let conn = index::open_index(&index_path).unwrap();
        let index_stats = index::index_stats(&conn).unwrap();
        assert_eq!(index_stats.sources_count, 1);
    }

    #[tokio::test]
    async fn test_missing_docs_dir_errors() {
        let (temp, mut options, embedder) = setup();
        options.docs_dir = temp.path().join("nope");

        let index_path = temp.path().join("index.db");
        let result = ingest_documents(&index_path, &options, &embedder).await;
        assert!(result.is_err());
    }
}
