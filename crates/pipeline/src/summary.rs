//! Result summarization.
//!
//! Renders executed rows into a dual representation (an aligned tabular
//! view and a JSON view) and asks the model for a narrative summary.
//! Giving the model both a human-readable and a machine-precise view of the
//! same data measurably improves numeric accuracy in summaries.

use datachat_core::{AppError, AppResult};
use datachat_llm::{LlmClient, LlmRequest};
use datachat_prompt::result_summary_prompt;
use datachat_store::ResultSet;
use serde_json::Value;

/// Format query results for inclusion in the summarization prompt.
///
/// Produces a `Tabular format:` section followed by a `JSON format:`
/// section over the same rows.
pub fn format_results_as_string(results: &ResultSet) -> String {
    if results.rows.is_empty() {
        return "No results found.".to_string();
    }

    let tabular = render_table(results);

    let json_rows: Vec<Value> = results
        .rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            for column in &results.columns {
                object.insert(
                    column.clone(),
                    row.get(column).cloned().unwrap_or(Value::Null),
                );
            }
            Value::Object(object)
        })
        .collect();
    let json = serde_json::to_string_pretty(&Value::Array(json_rows))
        .unwrap_or_else(|e| format!("Error formatting results: {}", e));

    format!("Tabular format:\n{}\n\nJSON format:\n{}", tabular, json)
}

/// Render rows as an aligned plain-text table, columns in projection order.
pub fn render_table(results: &ResultSet) -> String {
    let mut widths: Vec<usize> = results.columns.iter().map(|c| c.len()).collect();

    let rendered_rows: Vec<Vec<String>> = results
        .rows
        .iter()
        .map(|row| {
            results
                .columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let cell = match row.get(column) {
                        Some(Value::String(s)) => s.clone(),
                        Some(Value::Null) | None => String::new(),
                        Some(other) => other.to_string(),
                    };
                    widths[i] = widths[i].max(cell.len());
                    cell
                })
                .collect()
        })
        .collect();

    let mut out = String::new();

    let header: Vec<String> = results
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for row in rendered_rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}

/// Summarize executed query results in natural language.
///
/// Failure is an explicit `Err`, never an error message disguised as a
/// summary; the orchestrator decides how to degrade.
pub async fn summarize(
    client: &dyn LlmClient,
    model: &str,
    question: &str,
    query_text: &str,
    results: &ResultSet,
) -> AppResult<String> {
    let results_str = format_results_as_string(results);
    let prompt = result_summary_prompt(question, query_text, &results_str)?;

    let request = LlmRequest::new(prompt, model).with_temperature(0.2);

    let response = client
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Error generating summary: {}", e)))?;

    Ok(response.content)
}
