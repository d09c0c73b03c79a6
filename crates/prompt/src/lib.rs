//! Prompt system for the datachat CLI.
//!
//! Fixed, parameterized Handlebars templates for the four completion calls
//! the pipelines make: routing, SQL generation, result summarization, and
//! retrieval answering.

pub mod templates;

// Re-export render functions
pub use templates::{rag_answer_prompt, result_summary_prompt, router_prompt, sql_generation_prompt};
