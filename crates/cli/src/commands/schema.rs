//! Schema command: show the database schema and sample rows.

use clap::Args;
use datachat_core::{config::AppConfig, AppResult};
use datachat_pipeline::render_table;
use datachat_store::Database;

/// Show the database schema and sample rows
#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Number of sample rows to show per table
    #[arg(short = 'n', long, default_value = "5")]
    pub sample_rows: usize,
}

impl SchemaCommand {
    /// Execute the schema command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let db = Database::new(config.database.clone());

        println!("{}", db.schema_description()?);

        if self.sample_rows == 0 {
            return Ok(());
        }

        for table in db.schema()? {
            let results = db.sample_rows(&table.name, self.sample_rows);

            println!("Sample data from {}:", table.name);
            if let Some(error) = results.execution_error {
                println!("  (unavailable: {})", error);
            } else if results.rows.is_empty() {
                println!("  (empty)");
            } else {
                println!("{}", render_table(&results));
            }
        }

        Ok(())
    }
}
