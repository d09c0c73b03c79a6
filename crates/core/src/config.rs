//! Configuration management for the datachat CLI.
//!
//! Configuration merges three sources, lowest to highest precedence:
//! built-in defaults plus environment variables, an optional `datachat.yaml`
//! file, and command-line flags applied via [`AppConfig::with_overrides`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global options that affect CLI behavior across
/// commands: where the relational store and document corpus live, which
/// LLM provider answers questions, and how retrieval is tuned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the relational dataset
    pub database: PathBuf,

    /// Directory containing documents for the retrieval corpus
    pub docs_dir: PathBuf,

    /// Path to the SQLite passage index
    pub index_path: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider (e.g. "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// API key for providers that require one
    pub api_key: Option<String>,

    /// Embedding settings for the document index
    pub embedding: EmbeddingSettings,

    /// Number of passages retrieved per question
    pub top_k: usize,

    /// Maximum characters per passage chunk
    pub chunk_size: usize,

    /// Overlap in characters between consecutive chunks
    pub chunk_overlap: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding provider ("trigram" or "ollama")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Embedding vector dimension
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
        }
    }
}

/// Full configuration file structure (`datachat.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    store: Option<StoreSection>,
    docs: Option<DocsSection>,
    llm: Option<LlmSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreSection {
    database: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocsSection {
    dir: Option<String>,
    index: Option<String>,
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
    #[serde(rename = "chunkOverlap")]
    chunk_overlap: Option<usize>,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    embedding: Option<EmbeddingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("sales.db"),
            docs_dir: PathBuf::from("docs"),
            index_path: PathBuf::from(".datachat/index.db"),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            embedding: EmbeddingSettings::default(),
            top_k: 3,
            chunk_size: 1000,
            chunk_overlap: 200,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional
    /// `datachat.yaml` file.
    ///
    /// Environment variables:
    /// - `DATACHAT_DB`: Path to the SQLite database
    /// - `DATACHAT_DOCS`: Documents directory
    /// - `DATACHAT_INDEX`: Passage index path
    /// - `DATACHAT_CONFIG`: Path to config file
    /// - `DATACHAT_PROVIDER`: LLM provider
    /// - `DATACHAT_MODEL`: Completion model identifier
    /// - `DATACHAT_ENDPOINT`: Custom provider endpoint
    /// - `DATACHAT_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("DATACHAT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("datachat.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(database) = std::env::var("DATACHAT_DB") {
            config.database = PathBuf::from(database);
        }

        if let Ok(docs) = std::env::var("DATACHAT_DOCS") {
            config.docs_dir = PathBuf::from(docs);
        }

        if let Ok(index) = std::env::var("DATACHAT_INDEX") {
            config.index_path = PathBuf::from(index);
        }

        if let Ok(provider) = std::env::var("DATACHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DATACHAT_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("DATACHAT_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if config.api_key.is_none() {
            config.api_key = std::env::var("DATACHAT_API_KEY").ok();
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(store) = config_file.store {
            if let Some(database) = store.database {
                result.database = PathBuf::from(database);
            }
        }

        if let Some(docs) = config_file.docs {
            if let Some(dir) = docs.dir {
                result.docs_dir = PathBuf::from(dir);
            }
            if let Some(index) = docs.index {
                result.index_path = PathBuf::from(index);
            }
            if let Some(chunk_size) = docs.chunk_size {
                result.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = docs.chunk_overlap {
                result.chunk_overlap = chunk_overlap;
            }
            if let Some(top_k) = docs.top_k {
                result.top_k = top_k;
            }
            if let Some(embedding) = docs.embedding {
                if let Some(provider) = embedding.provider {
                    result.embedding.provider = provider;
                }
                if let Some(model) = embedding.model {
                    result.embedding.model = model;
                }
                if let Some(dimensions) = embedding.dimensions {
                    result.embedding.dimensions = dimensions;
                }
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
            if let Some(api_key_env) = llm.api_key_env {
                if let Ok(key) = std::env::var(&api_key_env) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the YAML config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        database: Option<PathBuf>,
        docs_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(database) = database {
            self.database = database;
        }

        if let Some(docs_dir) = docs_dir {
            self.docs_dir = docs_dir;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Ensure the directory holding the passage index exists.
    pub fn ensure_index_dir(&self) -> AppResult<()> {
        if let Some(parent) = self.index_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Config(format!("Failed to create index directory: {}", e))
                })?;
            }
        }
        Ok(())
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "openai", "claude"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        // Remote providers need a key; Ollama does not
        if matches!(self.provider.as_str(), "openai" | "claude") && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "Provider '{}' requires an API key (set DATACHAT_API_KEY)",
                self.provider
            )));
        }

        let known_embedding = ["trigram", "ollama"];
        if !known_embedding.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embedding.join(", ")
            )));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}
