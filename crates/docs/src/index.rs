//! SQLite-backed passage index.
//!
//! Stores passages with their embeddings and answers top-k similarity
//! queries by scanning and scoring with cosine similarity. Adequate for
//! corpora of a few thousand passages; no approximate-NN structure.

use crate::types::{IndexStats, Passage, SourceRecord};
use chrono::{DateTime, Utc};
use datachat_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// Open the index database, creating tables if needed.
pub fn open_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Docs(format!("Failed to create index directory: {}", e)))?;
        }
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Docs(format!("Failed to open passage index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            content_hash TEXT NOT NULL,
            indexed_at TEXT NOT NULL,
            chunk_count INTEGER NOT NULL,
            byte_count INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS passages (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            FOREIGN KEY (source_id) REFERENCES sources(id)
        );

        CREATE INDEX IF NOT EXISTS idx_passages_source ON passages(source_id);
        "#,
    )
    .map_err(|e| AppError::Docs(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Opened passage index at {:?}", db_path);
    Ok(conn)
}

/// Insert or update a source record.
pub fn upsert_source(conn: &Connection, source: &SourceRecord) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sources (id, path, content_hash, indexed_at, chunk_count, byte_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            source.id,
            source.path,
            source.content_hash,
            source.indexed_at.to_rfc3339(),
            source.chunk_count as i64,
            source.byte_count as i64,
        ],
    )
    .map_err(|e| AppError::Docs(format!("Failed to insert source: {}", e)))?;

    Ok(())
}

/// Look up a source record by path.
pub fn find_source(conn: &Connection, path: &str) -> AppResult<Option<SourceRecord>> {
    let mut stmt = conn
        .prepare("SELECT id, path, content_hash, indexed_at, chunk_count, byte_count FROM sources WHERE path = ?1")
        .map_err(|e| AppError::Docs(format!("Failed to query sources: {}", e)))?;

    let mut rows = stmt
        .query_map(params![path], |row| {
            let indexed_at: String = row.get(3)?;
            Ok(SourceRecord {
                id: row.get(0)?,
                path: row.get(1)?,
                content_hash: row.get(2)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
                chunk_count: row.get::<_, i64>(4)? as u32,
                byte_count: row.get::<_, i64>(5)? as u64,
            })
        })
        .map_err(|e| AppError::Docs(format!("Failed to query sources: {}", e)))?;

    match rows.next() {
        Some(Ok(record)) => Ok(Some(record)),
        Some(Err(e)) => Err(AppError::Docs(format!("Failed to read source row: {}", e))),
        None => Ok(None),
    }
}

/// Delete all passages belonging to a source.
pub fn delete_passages_for(conn: &Connection, source_id: &str) -> AppResult<()> {
    conn.execute("DELETE FROM passages WHERE source_id = ?1", params![source_id])
        .map_err(|e| AppError::Docs(format!("Failed to delete passages: {}", e)))?;
    Ok(())
}

/// Insert a passage with its embedding.
pub fn insert_passage(conn: &Connection, passage: &Passage, embedding: &[f32]) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO passages (id, source_id, position, text, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            passage.id,
            passage.source_id,
            passage.position as i64,
            passage.text,
            embedding_to_bytes(embedding),
        ],
    )
    .map_err(|e| AppError::Docs(format!("Failed to insert passage: {}", e)))?;

    Ok(())
}

/// Query the index for the top-k passages most similar to the query
/// embedding, scored by cosine similarity, descending.
pub fn search_passages(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<(Passage, f32)>> {
    let mut stmt = conn
        .prepare(
            "SELECT p.id, p.source_id, p.position, p.text, p.embedding, s.path
             FROM passages p JOIN sources s ON s.id = p.source_id",
        )
        .map_err(|e| AppError::Docs(format!("Failed to prepare search: {}", e)))?;

    let scored_iter = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let path: String = row.get(5)?;

            Ok((
                Passage {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    source_name: file_name_of(&path),
                    position: row.get::<_, i64>(2)? as u32,
                    text: row.get(3)?,
                },
                embedding_bytes,
            ))
        })
        .map_err(|e| AppError::Docs(format!("Failed to search passages: {}", e)))?;

    let mut results: Vec<(Passage, f32)> = scored_iter
        .filter_map(|r| r.ok())
        .map(|(passage, bytes)| {
            let embedding = bytes_to_embedding(&bytes);
            let score = cosine_similarity(query_embedding, &embedding);
            (passage, score)
        })
        .collect();

    results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);

    tracing::debug!("Retrieved {} passages (requested top-{})", results.len(), top_k);

    Ok(results)
}

/// Get counts of sources and passages.
pub fn index_stats(conn: &Connection) -> AppResult<IndexStats> {
    let sources_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM sources", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Docs(format!("Failed to count sources: {}", e)))?;

    let passages_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM passages", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Docs(format!("Failed to count passages: {}", e)))?;

    Ok(IndexStats {
        sources_count,
        passages_count,
    })
}

/// Reset the index, removing all passages and sources.
pub fn reset_index(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM passages", [])
        .map_err(|e| AppError::Docs(format!("Failed to delete passages: {}", e)))?;

    conn.execute("DELETE FROM sources", [])
        .map_err(|e| AppError::Docs(format!("Failed to delete sources: {}", e)))?;

    tracing::info!("Reset passage index");
    Ok(())
}

/// Extract a file name from a path string.
fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Convert an embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector. Trailing partial
/// values are dropped.
fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors; 0.0 on length mismatch or a
/// zero vector.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
