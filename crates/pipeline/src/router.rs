//! Question routing.
//!
//! A single-stage decision: greeting patterns short-circuit without a model
//! call; everything else is classified by one completion call expected to
//! answer with a single word. An ambiguous answer is surfaced immediately:
//! a second attempt would be no more reliable than the first.

use crate::types::{Route, RouteDecision};
use datachat_llm::{LlmClient, LlmRequest};
use datachat_prompt::router_prompt;

/// Small-talk openers that never reach the model.
const GREETINGS: &[&str] = &["hi", "hello", "hey", "greetings", "howdy"];

/// Canned guidance returned for greetings and small talk.
pub const GUIDANCE: &str = "I answer questions about your data and documents. \
    Try asking something like \"What are the total sales for each product category?\" \
    or \"What was our revenue in 2023?\"";

/// Check whether the question is a greeting (case-insensitive exact or
/// prefix match).
fn is_greeting(question: &str) -> bool {
    let q = question.trim().to_lowercase();
    GREETINGS
        .iter()
        .any(|g| q == *g || q.starts_with(&format!("{} ", g)))
}

/// Classify a question into one of the answering routes.
pub async fn classify(
    client: &dyn LlmClient,
    model: &str,
    schema_description: &str,
    question: &str,
) -> RouteDecision {
    if is_greeting(question) {
        tracing::debug!("Greeting detected, skipping classification call");
        return RouteDecision {
            route: Route::Unknown,
            diagnostic: Some(GUIDANCE.to_string()),
        };
    }

    let prompt = match router_prompt(schema_description, question) {
        Ok(prompt) => prompt,
        Err(e) => {
            return RouteDecision {
                route: Route::Unknown,
                diagnostic: Some(format!("Error routing question: {}", e)),
            }
        }
    };

    let request = LlmRequest::new(prompt, model).with_temperature(0.0);

    match client.complete(&request).await {
        Ok(response) => {
            let label = response.content.trim().to_lowercase();
            match label.as_str() {
                "sql" => RouteDecision {
                    route: Route::Sql,
                    diagnostic: None,
                },
                "rag" => RouteDecision {
                    route: Route::Rag,
                    diagnostic: None,
                },
                other => {
                    tracing::warn!("Unexpected routing label: {:?}", other);
                    RouteDecision {
                        route: Route::Unknown,
                        diagnostic: Some(format!(
                            "Could not determine how to answer this question (classifier said {:?}). Please try rephrasing it.",
                            other
                        )),
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!("Routing call failed: {}", e);
            RouteDecision {
                route: Route::Unknown,
                diagnostic: Some(format!("Error routing question: {}", e)),
            }
        }
    }
}
