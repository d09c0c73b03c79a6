//! LLM integration crate for the datachat CLI.
//!
//! Provides a provider-agnostic abstraction for text completion. Each
//! pipeline stage issues one completion call per question; the backend
//! is treated as an opaque, synchronous service.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - Future: OpenAI, Anthropic

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OllamaClient;
