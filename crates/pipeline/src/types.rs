//! Pipeline type definitions.
//!
//! Records flowing between stages, the final [`AnswerEnvelope`] crossing
//! into the presentation layer, and the conversation log types the
//! presentation layer owns.

use datachat_docs::ScoredPassage;
use datachat_store::ResultSet;
use serde::{Deserialize, Serialize};

/// The classification of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Answer by generating and executing a structured query
    Sql,

    /// Answer from the document corpus
    Rag,

    /// Neither system applies, or classification failed
    Unknown,
}

/// Result of routing a question. Produced once per question, never mutated.
#[derive(Debug, Clone)]
pub struct RouteDecision {
    pub route: Route,

    /// Present when routing could not commit to a system; carries user
    /// guidance or the raw classification failure
    pub diagnostic: Option<String>,
}

/// A generated query plus the verdict of the safety gate.
///
/// `is_valid` is true only if the text begins with a read-only clause and
/// contains no mutating keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuery {
    /// The extracted query text
    pub raw_text: String,

    /// Whether the safety gate passed
    pub is_valid: bool,

    /// Rejection reason when `is_valid` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

/// Output of the query-generation pipeline.
#[derive(Debug, Clone)]
pub struct SqlAnswer {
    pub query: GeneratedQuery,
    pub results: ResultSet,

    /// First failure encountered across the generate/validate/execute stages
    pub diagnostic: Option<String>,
}

/// Passages retrieved for a question, relevance descending.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub passages: Vec<String>,
    pub source_refs: Vec<String>,
}

impl RetrievedContext {
    /// Build context from scored search results, preserving rank order.
    pub fn from_results(results: &[ScoredPassage]) -> Self {
        Self {
            passages: results.iter().map(|r| r.passage.text.clone()).collect(),
            source_refs: results
                .iter()
                .map(|r| r.passage.source_name.clone())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Concatenate passages into a single context block, order preserved.
    pub fn as_context_block(&self) -> String {
        self.passages.join("\n\n")
    }
}

/// Output of the retrieval-answering pipeline.
///
/// `answer` is always a textual response, even on failure; `diagnostic`
/// carries the underlying failure when one occurred.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    pub diagnostic: Option<String>,
}

/// The final unified response crossing into the presentation layer.
///
/// Constructed fresh per question and immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnswerEnvelope {
    /// Structured-query route: summary plus the executed query and rows
    Sql {
        summary: String,
        query: GeneratedQuery,
        results: ResultSet,
    },

    /// Retrieval route: a context-grounded answer
    Rag { summary: String },

    /// Any stage failed; diagnostic is the user-facing explanation
    Failure { diagnostic: String },
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
}

/// Payload of a conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogPayload {
    Envelope(AnswerEnvelope),
    Text(String),
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub speaker: Speaker,
    pub payload: LogPayload,
}

/// Ordered conversation history, owned by the presentation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    pub entries: Vec<LogEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(LogEntry {
            speaker: Speaker::User,
            payload: LogPayload::Text(text.into()),
        });
    }

    /// Append a system turn carrying an envelope.
    pub fn push_system(&mut self, envelope: AnswerEnvelope) {
        self.entries.push(LogEntry {
            speaker: Speaker::System,
            payload: LogPayload::Envelope(envelope),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization_tags() {
        let envelope = AnswerEnvelope::Rag {
            summary: "answer text".to_string(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["kind"], "rag");
        assert_eq!(json["summary"], "answer text");

        let envelope = AnswerEnvelope::Failure {
            diagnostic: "it broke".to_string(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["kind"], "failure");
        assert_eq!(json["diagnostic"], "it broke");
    }

    #[test]
    fn test_envelope_sql_roundtrip() {
        let envelope = AnswerEnvelope::Sql {
            summary: "two rows".to_string(),
            query: GeneratedQuery {
                raw_text: "SELECT 1".to_string(),
                is_valid: true,
                validation_error: None,
            },
            results: datachat_store::ResultSet::default(),
        };

        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: AnswerEnvelope = serde_json::from_str(&json).unwrap();
        match parsed {
            AnswerEnvelope::Sql { summary, query, .. } => {
                assert_eq!(summary, "two rows");
                assert_eq!(query.raw_text, "SELECT 1");
            }
            _ => panic!("Expected sql envelope"),
        }
    }

    #[test]
    fn test_conversation_log_ordering() {
        let mut log = ConversationLog::new();
        log.push_user("hello");
        log.push_system(AnswerEnvelope::Failure {
            diagnostic: "guidance".to_string(),
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries[0].speaker, Speaker::User);
        assert_eq!(log.entries[1].speaker, Speaker::System);
    }

    #[test]
    fn test_retrieved_context_block_preserves_order() {
        let context = RetrievedContext {
            passages: vec!["first".to_string(), "second".to_string()],
            source_refs: vec!["a.txt".to_string(), "b.txt".to_string()],
        };

        let block = context.as_context_block();
        assert!(block.find("first").unwrap() < block.find("second").unwrap());
    }
}
