//! Pipeline orchestration.
//!
//! [`Engine`] is the top-level dispatcher: route the question, run the
//! selected pipeline, summarize on the structured-query route, and assemble
//! a unified [`AnswerEnvelope`]. One engine is constructed per process and
//! shared by reference; all collaborators are read-only after construction.

use crate::types::{AnswerEnvelope, ConversationLog, Route};
use crate::{rag, router, sqlgen, summary};
use datachat_core::AppResult;
use datachat_docs::PassageSearch;
use datachat_llm::LlmClient;
use datachat_store::Database;
use std::sync::Arc;

/// The answering engine: router, pipelines, and their collaborators.
pub struct Engine {
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn PassageSearch>,
    db: Database,
    schema_description: String,
    model: String,
    top_k: usize,
}

impl Engine {
    /// Build an engine. Introspects the store once; the rendered schema
    /// description is reused for every question.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        retriever: Arc<dyn PassageSearch>,
        db: Database,
        model: impl Into<String>,
        top_k: usize,
    ) -> AppResult<Self> {
        let schema_description = db.schema_description()?;

        Ok(Self {
            llm,
            retriever,
            db,
            schema_description,
            model: model.into(),
            top_k,
        })
    }

    /// The schema description used in prompts.
    pub fn schema_description(&self) -> &str {
        &self.schema_description
    }

    /// Handle one question: append the user turn, answer, append the
    /// system turn, return the envelope.
    ///
    /// No stage is retried; the first failure encountered becomes a
    /// `Failure` envelope, and none is silently swallowed.
    pub async fn handle(&self, question: &str, log: &mut ConversationLog) -> AnswerEnvelope {
        tracing::info!("Handling question");
        log.push_user(question);

        let decision = router::classify(
            self.llm.as_ref(),
            &self.model,
            &self.schema_description,
            question,
        )
        .await;

        let envelope = if let Some(diagnostic) = decision.diagnostic {
            AnswerEnvelope::Failure { diagnostic }
        } else {
            match decision.route {
                Route::Sql => self.answer_sql(question).await,
                Route::Rag => self.answer_rag(question).await,
                Route::Unknown => AnswerEnvelope::Failure {
                    diagnostic: "Could not determine how to answer this question. Please try rephrasing it.".to_string(),
                },
            }
        };

        log.push_system(envelope.clone());
        envelope
    }

    async fn answer_sql(&self, question: &str) -> AnswerEnvelope {
        tracing::debug!("Routing to structured-query pipeline");

        let answer = sqlgen::answer(
            self.llm.as_ref(),
            &self.model,
            &self.db,
            &self.schema_description,
            question,
        )
        .await;

        if let Some(diagnostic) = answer.diagnostic {
            return AnswerEnvelope::Failure { diagnostic };
        }

        let summary = match summary::summarize(
            self.llm.as_ref(),
            &self.model,
            question,
            &answer.query.raw_text,
            &answer.results,
        )
        .await
        {
            Ok(text) => text,
            Err(e) => {
                // Degrade visibly: the rows are still worth returning
                tracing::error!("Summary generation failed: {}", e);
                format!("{}. The executed query and raw results are attached.", e)
            }
        };

        AnswerEnvelope::Sql {
            summary,
            query: answer.query,
            results: answer.results,
        }
    }

    async fn answer_rag(&self, question: &str) -> AnswerEnvelope {
        tracing::debug!("Routing to retrieval pipeline");

        let answer = rag::answer(
            self.llm.as_ref(),
            &self.model,
            self.retriever.as_ref(),
            question,
            self.top_k,
        )
        .await;

        if let Some(diagnostic) = answer.diagnostic {
            return AnswerEnvelope::Failure { diagnostic };
        }

        AnswerEnvelope::Rag {
            summary: answer.answer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::NO_CONTEXT_ANSWER;
    use crate::router::GUIDANCE;
    use crate::testing::{seeded_sales_db, StubLlm, StubRetriever};

    fn build_engine(llm: Arc<StubLlm>, retriever: StubRetriever) -> (tempfile::NamedTempFile, Engine) {
        let file = seeded_sales_db();
        let db = Database::new(file.path());
        let engine = Engine::new(llm, Arc::new(retriever), db, "test-model", 3).unwrap();
        (file, engine)
    }

    #[tokio::test]
    async fn test_full_sql_scenario() {
        let llm = Arc::new(StubLlm::with_responses(&[
            "sql",
            "```sql\nSELECT category, SUM(amount) AS total FROM sales GROUP BY category ORDER BY total DESC;\n```",
            "Electronics leads with 5000, followed by Clothing with 3000.",
        ]));
        let (_file, engine) = build_engine(llm.clone(), StubRetriever::empty());

        let mut log = ConversationLog::new();
        let envelope = engine
            .handle("What are the total sales for each product category?", &mut log)
            .await;

        match envelope {
            AnswerEnvelope::Sql {
                summary,
                query,
                results,
            } => {
                assert!(summary.contains("Electronics"));
                assert!(summary.contains("5000"));
                assert!(query.raw_text.contains("GROUP BY category"));
                assert_eq!(results.row_count(), 2);
            }
            other => panic!("Expected sql envelope, got {:?}", other),
        }

        // Router, generation, summary: three completion calls
        assert_eq!(llm.call_count(), 3);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_full_rag_scenario() {
        let llm = Arc::new(StubLlm::with_responses(&[
            "rag",
            "Revenue in 2023 was 4.2 million dollars.",
        ]));
        let retriever = StubRetriever::with_passages(&[
            "Annual revenue for 2023 reached 4.2 million dollars.",
            "Growth was strongest in the East region.",
        ]);
        let (_file, engine) = build_engine(llm.clone(), retriever);

        let mut log = ConversationLog::new();
        let envelope = engine.handle("What was our revenue in 2023?", &mut log).await;

        match envelope {
            AnswerEnvelope::Rag { summary } => {
                assert_eq!(summary, "Revenue in 2023 was 4.2 million dollars.");
            }
            other => panic!("Expected rag envelope, got {:?}", other),
        }

        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_retrieval_degrades_without_model_call() {
        let llm = Arc::new(StubLlm::with_responses(&["rag"]));
        let (_file, engine) = build_engine(llm.clone(), StubRetriever::empty());

        let mut log = ConversationLog::new();
        let envelope = engine.handle("Something undocumented?", &mut log).await;

        match envelope {
            AnswerEnvelope::Rag { summary } => assert_eq!(summary, NO_CONTEXT_ANSWER),
            other => panic!("Expected rag envelope, got {:?}", other),
        }

        // Only the router call; the answer stage spent nothing
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_execution_failure_skips_summarization() {
        let llm = Arc::new(StubLlm::with_responses(&[
            "sql",
            "```sql\nSELECT * FROM missing_table;\n```",
            "unused summary",
        ]));
        let (_file, engine) = build_engine(llm.clone(), StubRetriever::empty());

        let mut log = ConversationLog::new();
        let envelope = engine.handle("Query a missing table", &mut log).await;

        match envelope {
            AnswerEnvelope::Failure { diagnostic } => {
                assert!(diagnostic.contains("missing_table"));
            }
            other => panic!("Expected failure envelope, got {:?}", other),
        }

        // Router + generation only; no summarization attempted
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_greeting_produces_guidance_failure() {
        let llm = Arc::new(StubLlm::with_responses(&["sql"]));
        let (_file, engine) = build_engine(llm.clone(), StubRetriever::empty());

        let mut log = ConversationLog::new();
        let envelope = engine.handle("hello", &mut log).await;

        match envelope {
            AnswerEnvelope::Failure { diagnostic } => assert_eq!(diagnostic, GUIDANCE),
            other => panic!("Expected failure envelope, got {:?}", other),
        }

        assert_eq!(llm.call_count(), 0);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_summary_failure_degrades_but_keeps_rows() {
        // Two responses: router + generation; the summary call then fails
        let llm = Arc::new(StubLlm::with_responses_then_fail(&[
            "sql",
            "```sql\nSELECT category, SUM(amount) AS total FROM sales GROUP BY category;\n```",
        ]));
        let (_file, engine) = build_engine(llm.clone(), StubRetriever::empty());

        let mut log = ConversationLog::new();
        let envelope = engine.handle("Totals per category?", &mut log).await;

        match envelope {
            AnswerEnvelope::Sql {
                summary, results, ..
            } => {
                assert!(summary.contains("Error generating summary"));
                assert_eq!(results.row_count(), 2);
            }
            other => panic!("Expected sql envelope, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_log_records_user_then_system() {
        let llm = Arc::new(StubLlm::with_responses(&["rag", "answer"]));
        let retriever = StubRetriever::with_passages(&["a passage"]);
        let (_file, engine) = build_engine(llm, retriever);

        let mut log = ConversationLog::new();
        engine.handle("first question", &mut log).await;
        engine.handle("hello", &mut log).await;

        assert_eq!(log.len(), 4);
        use crate::types::{LogPayload, Speaker};
        assert_eq!(log.entries[0].speaker, Speaker::User);
        assert!(matches!(log.entries[0].payload, LogPayload::Text(_)));
        assert_eq!(log.entries[1].speaker, Speaker::System);
        assert!(matches!(log.entries[1].payload, LogPayload::Envelope(_)));
    }
}
