//! Passage retrieval.
//!
//! The [`PassageSearch`] trait is the similarity-index boundary consumed by
//! the answering pipelines; [`Retriever`] is the index-backed implementation.

use crate::embeddings::EmbeddingProvider;
use crate::index;
use crate::types::ScoredPassage;
use datachat_core::AppResult;
use std::path::PathBuf;
use std::sync::Arc;

/// Minimum cosine similarity for a passage to be considered relevant.
const MIN_RELEVANCE_SCORE: f32 = 0.20;

/// Similarity-search boundary.
///
/// Returns ranked passages, relevance descending. An empty result means
/// "no match", which callers treat as a valid terminal state rather than
/// an error.
#[async_trait::async_trait]
pub trait PassageSearch: Send + Sync {
    /// Search for the top-k passages most relevant to the query text.
    async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<ScoredPassage>>;
}

/// Index-backed retriever.
pub struct Retriever {
    index_path: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever over the index at `index_path`.
    pub fn new(index_path: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            index_path: index_path.into(),
            embedder,
        }
    }
}

#[async_trait::async_trait]
impl PassageSearch for Retriever {
    async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<ScoredPassage>> {
        let query_embedding = self.embedder.embed(query).await?;

        let conn = index::open_index(&self.index_path)?;
        let results = index::search_passages(&conn, &query_embedding, top_k)?;

        let relevant: Vec<ScoredPassage> = results
            .into_iter()
            .filter(|(_, score)| *score >= MIN_RELEVANCE_SCORE)
            .map(|(passage, score)| ScoredPassage { passage, score })
            .collect();

        tracing::debug!(
            "Retrieved {} relevant passages for query ({} requested)",
            relevant.len(),
            top_k
        );

        Ok(relevant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::trigram::TrigramProvider;
    use crate::ingest;
    use crate::types::IngestOptions;
    use tempfile::TempDir;

    async fn seeded_retriever() -> (TempDir, Retriever) {
        let temp = TempDir::new().unwrap();
        let docs_dir = temp.path().join("docs");
        std::fs::create_dir_all(&docs_dir).unwrap();

        std::fs::write(
            docs_dir.join("sales_report.txt"),
            "Annual revenue for 2023 reached 4.2 million dollars across all regions.",
        )
        .unwrap();
        std::fs::write(
            docs_dir.join("strategy.txt"),
            "The 2024 product strategy focuses on expanding the clothing category.",
        )
        .unwrap();

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TrigramProvider::new(128));
        let index_path = temp.path().join("index.db");

        let options = IngestOptions {
            docs_dir,
            chunk_size: 500,
            chunk_overlap: 50,
            reset: false,
        };
        ingest::ingest_documents(&index_path, &options, &embedder)
            .await
            .unwrap();

        let retriever = Retriever::new(index_path, embedder);
        (temp, retriever)
    }

    #[tokio::test]
    async fn test_search_finds_relevant_passage() {
        let (_temp, retriever) = seeded_retriever().await;

        let results = retriever
            .search("What was annual revenue in 2023?", 2)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results[0].passage.text.contains("revenue"));
        assert!(results[0].score >= MIN_RELEVANCE_SCORE);
    }

    #[tokio::test]
    async fn test_search_empty_index_returns_nothing() {
        let temp = TempDir::new().unwrap();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TrigramProvider::new(128));
        let retriever = Retriever::new(temp.path().join("empty.db"), embedder);

        let results = retriever.search("anything at all", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_results_ranked_descending() {
        let (_temp, retriever) = seeded_retriever().await;

        let results = retriever
            .search("product strategy for clothing", 2)
            .await
            .unwrap();

        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
