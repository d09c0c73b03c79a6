//! Retrieval-answering pipeline.
//!
//! Two stages: retrieve top-k passages, then generate a context-grounded
//! answer. Retrieval failure degrades to empty context rather than a hard
//! stop, and an empty context answers deterministically without spending a
//! model call. The caller always gets a textual answer.

use crate::types::{RagAnswer, RetrievedContext};
use datachat_docs::PassageSearch;
use datachat_llm::{LlmClient, LlmRequest};
use datachat_prompt::rag_answer_prompt;

/// Canned answer when no relevant passages exist.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information to answer your question.";

/// Canned answer when answer generation itself fails.
pub const FAILURE_ANSWER: &str = "I ran into a problem while trying to answer your question.";

/// Answer a question from the document corpus.
pub async fn answer(
    client: &dyn LlmClient,
    model: &str,
    retriever: &dyn PassageSearch,
    question: &str,
    top_k: usize,
) -> RagAnswer {
    // Stage 1: retrieve; a search failure becomes empty context plus
    // diagnostic, handled explicitly below
    let (context, retrieval_diagnostic) = match retriever.search(question, top_k).await {
        Ok(results) => (RetrievedContext::from_results(&results), None),
        Err(e) => {
            tracing::warn!("Passage retrieval failed: {}", e);
            (
                RetrievedContext::default(),
                Some(format!("Error retrieving documents: {}", e)),
            )
        }
    };

    // Stage 2: empty context gets the deterministic canned answer, no
    // model call spent
    if context.is_empty() {
        tracing::debug!("No relevant passages for question");
        return RagAnswer {
            answer: NO_CONTEXT_ANSWER.to_string(),
            diagnostic: retrieval_diagnostic,
        };
    }

    tracing::debug!(
        "Answering from {} passages (sources: {:?})",
        context.passages.len(),
        context.source_refs
    );

    let prompt = match rag_answer_prompt(question, &context.as_context_block()) {
        Ok(prompt) => prompt,
        Err(e) => {
            return RagAnswer {
                answer: FAILURE_ANSWER.to_string(),
                diagnostic: Some(format!("Error generating answer: {}", e)),
            }
        }
    };

    let request = LlmRequest::new(prompt, model).with_temperature(0.2);

    match client.complete(&request).await {
        Ok(response) => RagAnswer {
            answer: response.content,
            diagnostic: retrieval_diagnostic,
        },
        Err(e) => {
            tracing::error!("Answer generation failed: {}", e);
            RagAnswer {
                answer: FAILURE_ANSWER.to_string(),
                diagnostic: Some(format!("Error generating answer: {}", e)),
            }
        }
    }
}
