//! Embedding providers for the document index.

pub mod ollama;
pub mod trigram;

use datachat_core::config::EmbeddingSettings;
use datachat_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Docs("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_embedder(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(trigram::TrigramProvider::new(
            settings.dimensions,
        ))),
        "ollama" => Ok(Arc::new(ollama::OllamaEmbedder::new(
            settings.model.clone(),
            settings.dimensions,
        ))),
        other => Err(AppError::Docs(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            other
        ))),
    }
}
