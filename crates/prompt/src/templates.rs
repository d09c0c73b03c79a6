//! Prompt templates for the answering pipelines.
//!
//! Four fixed templates parameterized over the question, the store's schema
//! description, retrieved context, and executed results. Pure string
//! construction: no state beyond the template text itself.

use datachat_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Template for routing a question between the SQL and retrieval systems.
const ROUTER_TEMPLATE: &str = r#"You are an expert system that decides whether a user's question should be answered by running a SQL query against a database or by retrieving information from a document collection.

The system has two capabilities:
1. sql: questions about metrics, statistics, and quantitative analysis that can be answered by querying the database described below.
2. rag: questions about reports, strategies, policies, and other qualitative information found in documents.

{{schema}}

User Question:
{{question}}

Determine whether this question should be routed to the SQL system or the retrieval system.
Respond with exactly one word: either "sql" or "rag".
"#;

/// Template for generating a SQL query from a question.
const SQL_GENERATION_TEMPLATE: &str = r#"You are an expert SQL query generator that converts natural language questions into SQL queries.

{{schema}}

Generate a single read-only SQL query that answers the user's question. Wrap the query in a ```sql code block.

Question: {{question}}

SQL:
"#;

/// Template for summarizing executed query results.
const RESULT_SUMMARY_TEMPLATE: &str = r#"You are an expert data analyst who explains SQL query results in clear, natural language.

The user asked the following question:
{{question}}

The SQL query that was executed:
```sql
{{query}}
```

The query returned the following results:
{{results}}

Provide a summary of these results that answers the user's question.
Focus on the key insights, trends, and notable data points.
Use clear, concise language that a business user would understand.
If appropriate, suggest follow-up questions that might provide further insight.

Your summary:
"#;

/// Template for answering a question from retrieved document context.
const RAG_ANSWER_TEMPLATE: &str = r#"You are an analyst who answers questions based only on the provided documents.

User Question:
{{question}}

Relevant Documents:
{{context}}

Answer the user's question using only the information in the documents above.
If the documents do not contain enough information to answer the question, say so explicitly.
Use clear, concise language that a business user would understand.

Your answer:
"#;

/// Render the routing prompt.
///
/// `schema` is the capability description: what the structured store covers,
/// rendered as the schema description string.
pub fn router_prompt(schema: &str, question: &str) -> AppResult<String> {
    render(
        ROUTER_TEMPLATE,
        &[("schema", schema), ("question", question)],
    )
}

/// Render the SQL generation prompt.
pub fn sql_generation_prompt(schema: &str, question: &str) -> AppResult<String> {
    render(
        SQL_GENERATION_TEMPLATE,
        &[("schema", schema), ("question", question)],
    )
}

/// Render the result summarization prompt.
pub fn result_summary_prompt(question: &str, query: &str, results: &str) -> AppResult<String> {
    render(
        RESULT_SUMMARY_TEMPLATE,
        &[("question", question), ("query", query), ("results", results)],
    )
}

/// Render the retrieval answering prompt.
pub fn rag_answer_prompt(question: &str, context: &str) -> AppResult<String> {
    render(
        RAG_ANSWER_TEMPLATE,
        &[("question", question), ("context", context)],
    )
}

/// Render a Handlebars template with variables.
fn render(template: &str, variables: &[(&str, &str)]) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let vars: HashMap<&str, &str> = variables.iter().copied().collect();

    let rendered = handlebars
        .render("prompt", &vars)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    tracing::debug!("Rendered prompt ({} chars)", rendered.len());

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_prompt_embeds_question_and_schema() {
        let prompt = router_prompt("Table: sales", "How many orders?").unwrap();
        assert!(prompt.contains("Table: sales"));
        assert!(prompt.contains("How many orders?"));
        assert!(prompt.contains("exactly one word"));
    }

    #[test]
    fn test_sql_generation_prompt() {
        let prompt = sql_generation_prompt("Table: products", "Top sellers?").unwrap();
        assert!(prompt.contains("Table: products"));
        assert!(prompt.contains("Top sellers?"));
        assert!(prompt.contains("```sql"));
    }

    #[test]
    fn test_result_summary_prompt() {
        let prompt = result_summary_prompt(
            "Total sales?",
            "SELECT SUM(amount) FROM sales",
            "Tabular format:\n...",
        )
        .unwrap();
        assert!(prompt.contains("Total sales?"));
        assert!(prompt.contains("SELECT SUM(amount) FROM sales"));
        assert!(prompt.contains("Tabular format:"));
    }

    #[test]
    fn test_rag_answer_prompt() {
        let prompt = rag_answer_prompt("Revenue in 2023?", "Revenue was $4.2M.").unwrap();
        assert!(prompt.contains("Revenue in 2023?"));
        assert!(prompt.contains("Revenue was $4.2M."));
        assert!(prompt.contains("only the information in the documents"));
    }

    #[test]
    fn test_render_does_not_escape() {
        let prompt = rag_answer_prompt("a < b?", "x > y & z").unwrap();
        assert!(prompt.contains("a < b?"));
        assert!(prompt.contains("x > y & z"));
    }
}
