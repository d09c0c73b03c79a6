//! Query-generation pipeline.
//!
//! Three stages, strictly sequential, no branching back: generate a query
//! from the question and schema description, validate it through the safety
//! gate, execute it against the store. A failure at any stage is terminal
//! for the question and reported verbatim upward.

use crate::types::{GeneratedQuery, SqlAnswer};
use datachat_llm::{LlmClient, LlmRequest};
use datachat_prompt::sql_generation_prompt;
use datachat_store::{Database, ResultSet};

/// Clauses a query may begin with.
const READ_ONLY_PREFIXES: &[&str] = &["SELECT", "WITH"];

/// Keywords that reject a query outright.
const MUTATING_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE",
];

/// Extract the query text from a completion response.
///
/// Prefers a ```sql fenced block. Without one, falls back to a line scan
/// that captures from the first line starting with a read-only clause
/// through the first line ending in `;`, for models that omit the fence.
fn extract_query(response: &str) -> String {
    if let Some(start) = response.find("```sql") {
        let rest = &response[start + "```sql".len()..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim().to_string();
        }
    }

    let mut captured = Vec::new();
    let mut capturing = false;

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if !capturing {
            let upper = line.to_uppercase();
            if READ_ONLY_PREFIXES.iter().any(|k| upper.starts_with(k)) {
                capturing = true;
            }
        }

        if capturing {
            captured.push(line);
            if line.ends_with(';') {
                break;
            }
        }
    }

    if !captured.is_empty() {
        return captured.join("\n");
    }

    response.trim().to_string()
}

/// Safety gate for generated queries.
///
/// The mutating-keyword check is a case-insensitive substring match over
/// the whole text, not a parse: a keyword inside a string literal or an
/// identifier like `created_at` also rejects. Known over-rejection.
fn check_query(query: &str) -> Result<(), String> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        return Err("Empty query".to_string());
    }

    let upper = trimmed.to_uppercase();

    if !READ_ONLY_PREFIXES.iter().any(|k| upper.starts_with(k)) {
        return Err("Only SELECT queries are allowed for safety reasons".to_string());
    }

    for keyword in MUTATING_KEYWORDS {
        if upper.contains(keyword) {
            return Err(format!("Dangerous keyword detected: {}", keyword));
        }
    }

    Ok(())
}

/// Run a query text through the safety gate.
pub fn validate(raw_text: String) -> GeneratedQuery {
    match check_query(&raw_text) {
        Ok(()) => GeneratedQuery {
            raw_text,
            is_valid: true,
            validation_error: None,
        },
        Err(error) => GeneratedQuery {
            raw_text,
            is_valid: false,
            validation_error: Some(error),
        },
    }
}

/// Answer a question by generating, validating, and executing a query.
pub async fn answer(
    client: &dyn LlmClient,
    model: &str,
    db: &Database,
    schema_description: &str,
    question: &str,
) -> SqlAnswer {
    // Stage 1: generate
    let prompt = match sql_generation_prompt(schema_description, question) {
        Ok(prompt) => prompt,
        Err(e) => {
            return SqlAnswer {
                query: validate(String::new()),
                results: ResultSet::default(),
                diagnostic: Some(format!("Error generating query: {}", e)),
            }
        }
    };

    let request = LlmRequest::new(prompt, model).with_temperature(0.0);

    let response = match client.complete(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Query generation call failed: {}", e);
            return SqlAnswer {
                query: validate(String::new()),
                results: ResultSet::default(),
                diagnostic: Some(format!("Error generating query: {}", e)),
            };
        }
    };

    // Stage 2: validate
    let query = validate(extract_query(&response.content));
    if !query.is_valid {
        tracing::warn!("Generated query rejected: {:?}", query.validation_error);
        let diagnostic = query.validation_error.clone();
        return SqlAnswer {
            query,
            results: ResultSet::default(),
            diagnostic,
        };
    }

    tracing::debug!("Executing generated query: {}", query.raw_text);

    // Stage 3: execute
    let results = db.execute_query(&query.raw_text);
    let diagnostic = results.execution_error.clone();

    SqlAnswer {
        query,
        results,
        diagnostic,
    }
}
