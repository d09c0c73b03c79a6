//! One-shot ask command.

use clap::Args;
use datachat_core::{config::AppConfig, AppError, AppResult};
use datachat_pipeline::ConversationLog;
use std::path::PathBuf;

/// Ask a single question and exit
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output the full answer envelope as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the executed query and raw rows in answers
    #[arg(long)]
    pub summary_only: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let question = self
            .get_question()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))?;

        tracing::debug!("Question: {}", question);

        let engine = super::build_engine(config)?;

        let mut log = ConversationLog::new();
        let envelope = engine.handle(&question, &mut log).await;

        if self.json {
            let json = serde_json::to_string_pretty(&envelope)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            super::render_envelope(&envelope, !self.summary_only);
        }

        Ok(())
    }

    /// Get the question text from the argument or a file.
    fn get_question(&self) -> Option<String> {
        self.question.clone().or_else(|| {
            self.file.as_ref().and_then(|path| {
                std::fs::read_to_string(path)
                    .map_err(|e| tracing::error!("Failed to read question file: {}", e))
                    .ok()
                    .map(|s| s.trim().to_string())
            })
        })
    }
}
