//! Stats command: show document index statistics.

use clap::Args;
use datachat_core::{config::AppConfig, AppResult};
use datachat_docs::index;

/// Show document index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {}

impl StatsCommand {
    /// Execute the stats command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        if !config.index_path.exists() {
            println!(
                "No document index at {}. Run 'datachat learn' first.",
                config.index_path.display()
            );
            return Ok(());
        }

        let conn = index::open_index(&config.index_path)?;
        let stats = index::index_stats(&conn)?;

        println!("Document index: {}", config.index_path.display());
        println!("  Sources:  {}", stats.sources_count);
        println!("  Passages: {}", stats.passages_count);

        Ok(())
    }
}
