//! Interactive chat command.
//!
//! Owns the conversation log for the session and renders each envelope as
//! it arrives. The log can be persisted to a transcript file on exit.

use clap::Args;
use datachat_core::{config::AppConfig, AppError, AppResult};
use datachat_pipeline::ConversationLog;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Write the conversation log to this file on exit (JSON)
    #[arg(short, long)]
    pub transcript: Option<PathBuf>,

    /// Hide the executed query and raw rows in answers
    #[arg(long)]
    pub summary_only: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let engine = super::build_engine(config)?;

        println!("datachat - ask questions about your sales data and documents.");
        println!("Examples:");
        println!("  What are the total sales for each product category?");
        println!("  What was our revenue in 2023?");
        println!("Type 'exit' or 'quit' to leave.\n");

        let mut log = ConversationLog::new();

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => break, // EOF
            };

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
                break;
            }

            let envelope = engine.handle(question, &mut log).await;
            super::render_envelope(&envelope, !self.summary_only);
            println!();
        }

        if let Some(ref path) = self.transcript {
            let json = serde_json::to_string_pretty(&log)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            std::fs::write(path, json)?;
            tracing::info!("Wrote transcript to {:?}", path);
            println!("Transcript saved to {}", path.display());
        }

        Ok(())
    }
}
