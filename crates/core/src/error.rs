//! Error types for the datachat CLI.
//!
//! This module defines a unified error enum covering the infrastructure
//! error categories: configuration, I/O, LLM, store, document index, and
//! prompt rendering. Failures inside the answering pipelines are NOT
//! represented here: each pipeline stage captures its own failure as a
//! plain-text diagnostic on its output record, and only infrastructure
//! errors travel as `AppError`.

use thiserror::Error;

/// Unified error type for the datachat CLI.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Relational store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Document index and retrieval errors
    #[error("Docs error: {0}")]
    Docs(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
