//! datachat CLI
//!
//! Main entry point for the datachat command-line tool: conversational
//! question answering over a relational dataset and a document corpus.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, LearnCommand, SchemaCommand, StatsCommand};
use datachat_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// datachat - ask questions about your data and documents
#[derive(Parser, Debug)]
#[command(name = "datachat")]
#[command(about = "Conversational analytics over a SQL database and a document corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, global = true, env = "DATACHAT_DB")]
    database: Option<PathBuf>,

    /// Directory containing documents for retrieval
    #[arg(long, global = true, env = "DATACHAT_DOCS")]
    docs: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DATACHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, openai, claude)
    #[arg(short, long, global = true, env = "DATACHAT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DATACHAT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive chat session
    Chat(ChatCommand),

    /// Ask a single question and exit
    Ask(AskCommand),

    /// Index documents for retrieval
    Learn(LearnCommand),

    /// Show the database schema and sample rows
    Schema(SchemaCommand),

    /// Show document index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment and config file
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.database,
        cli.docs,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("datachat starting");
    tracing::debug!("Database: {:?}", config.database);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Learn(_) => "learn",
        Commands::Schema(_) => "schema",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Learn(cmd) => cmd.execute(&config).await,
        Commands::Schema(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
