//! Routing-and-answering pipeline for the datachat CLI.
//!
//! A question flows through three decision stages: route (SQL vs.
//! retrieval), generate/retrieve, and summarize, with validation gates
//! between them. Each stage is a function from an input record to an
//! output record plus optional diagnostic; branching is an early return on
//! diagnostic presence, and the [`Engine`] assembles the final
//! [`AnswerEnvelope`] for the presentation layer.

pub mod engine;
pub mod rag;
pub mod router;
pub mod sqlgen;
pub mod summary;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use engine::Engine;
pub use summary::{format_results_as_string, render_table};
pub use types::{
    AnswerEnvelope, ConversationLog, GeneratedQuery, LogEntry, LogPayload, RagAnswer,
    RetrievedContext, Route, RouteDecision, Speaker, SqlAnswer,
};
