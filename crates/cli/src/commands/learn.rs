//! Learn command: index documents for retrieval.

use clap::Args;
use datachat_core::{config::AppConfig, AppResult};
use datachat_docs::{create_embedder, ingest_documents, IngestOptions};

/// Index documents for retrieval
#[derive(Args, Debug)]
pub struct LearnCommand {
    /// Clear the index before ingesting
    #[arg(long)]
    pub reset: bool,
}

impl LearnCommand {
    /// Execute the learn command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Indexing documents from {:?}", config.docs_dir);

        config.ensure_index_dir()?;

        let embedder = create_embedder(&config.embedding)?;

        let options = IngestOptions {
            docs_dir: config.docs_dir.clone(),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            reset: self.reset,
        };

        let stats = ingest_documents(&config.index_path, &options, &embedder).await?;

        println!(
            "Indexed {} sources ({} passages, {} bytes) in {:.2}s; {} unchanged sources skipped.",
            stats.sources_count,
            stats.chunks_count,
            stats.bytes_processed,
            stats.duration_secs,
            stats.skipped_count
        );

        Ok(())
    }
}
