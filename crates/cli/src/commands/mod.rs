//! Command handlers for the datachat CLI.

mod ask;
mod chat;
mod learn;
mod schema;
mod stats;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use learn::LearnCommand;
pub use schema::SchemaCommand;
pub use stats::StatsCommand;

use datachat_core::{config::AppConfig, AppError, AppResult};
use datachat_docs::{create_embedder, Retriever};
use datachat_pipeline::{render_table, AnswerEnvelope, Engine};
use datachat_store::Database;
use std::sync::Arc;

/// Build the answering engine from configuration.
///
/// Constructed once per process; commands share it by reference.
pub(crate) fn build_engine(config: &AppConfig) -> AppResult<Engine> {
    config.validate()?;

    if !config.database.exists() {
        return Err(AppError::Config(format!(
            "Database not found: {:?}. Point --database at your SQLite file.",
            config.database
        )));
    }

    let llm = datachat_llm::create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
    )?;

    let embedder = create_embedder(&config.embedding)?;
    let retriever = Arc::new(Retriever::new(config.index_path.clone(), embedder));

    let db = Database::new(config.database.clone());

    Engine::new(llm, retriever, db, config.model.clone(), config.top_k)
}

/// Render an envelope to stdout.
pub(crate) fn render_envelope(envelope: &AnswerEnvelope, show_details: bool) {
    match envelope {
        AnswerEnvelope::Sql {
            summary,
            query,
            results,
        } => {
            println!("{}", summary);

            if show_details {
                println!("\nSQL query:\n{}", query.raw_text);

                if results.rows.is_empty() {
                    println!("\nNo rows returned.");
                } else {
                    println!("\nResults:\n{}", render_table(results));
                }
            }
        }
        AnswerEnvelope::Rag { summary } => {
            println!("{}", summary);
        }
        AnswerEnvelope::Failure { diagnostic } => {
            println!("{}", diagnostic);
        }
    }
}
