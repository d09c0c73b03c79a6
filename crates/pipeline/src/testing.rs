//! Test doubles shared by the pipeline tests.

use datachat_core::{AppError, AppResult};
use datachat_docs::{Passage, PassageSearch, ScoredPassage};
use datachat_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use rusqlite::Connection;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

enum StubMode {
    /// Pop responses in order; keep repeating the last one
    RepeatLast,
    /// Pop responses in order; fail once exhausted
    FailWhenEmpty,
    /// Fail every call
    AlwaysFail,
}

/// Scripted completion client with a call counter.
pub(crate) struct StubLlm {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    mode: StubMode,
}

impl StubLlm {
    /// Answer calls from the queue, repeating the final response forever.
    pub fn with_responses(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            mode: StubMode::RepeatLast,
        }
    }

    /// Answer calls from the queue, then fail once it runs dry.
    pub fn with_responses_then_fail(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            mode: StubMode::FailWhenEmpty,
        }
    }

    /// Fail every call.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            mode: StubMode::AlwaysFail,
        }
    }

    /// Number of completion calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt sent, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl LlmClient for StubLlm {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        let content = match self.mode {
            StubMode::AlwaysFail => {
                return Err(AppError::Llm("stub completion failure".to_string()))
            }
            StubMode::RepeatLast => {
                let mut queue = self.responses.lock().unwrap();
                if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().unwrap_or_default()
                }
            }
            StubMode::FailWhenEmpty => {
                let mut queue = self.responses.lock().unwrap();
                match queue.pop_front() {
                    Some(content) => content,
                    None => return Err(AppError::Llm("stub completion failure".to_string())),
                }
            }
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Scripted passage retriever.
pub(crate) struct StubRetriever {
    passages: Vec<String>,
    fail: bool,
}

impl StubRetriever {
    pub fn with_passages(texts: &[&str]) -> Self {
        Self {
            passages: texts.iter().map(|s| s.to_string()).collect(),
            fail: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            passages: Vec::new(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            passages: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl PassageSearch for StubRetriever {
    async fn search(&self, _query: &str, top_k: usize) -> AppResult<Vec<ScoredPassage>> {
        if self.fail {
            return Err(AppError::Docs("stub index unavailable".to_string()));
        }

        Ok(self
            .passages
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(i, text)| ScoredPassage {
                passage: Passage {
                    id: format!("p{}", i),
                    source_id: "stub-source".to_string(),
                    source_name: "stub.txt".to_string(),
                    position: i as u32,
                    text: text.clone(),
                },
                score: 1.0 - 0.1 * i as f32,
            })
            .collect())
    }
}

/// Scratch sales database used across pipeline tests.
pub(crate) fn seeded_sales_db() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE sales (
            order_id INTEGER PRIMARY KEY,
            category TEXT NOT NULL,
            amount REAL NOT NULL
        );
        INSERT INTO sales (category, amount) VALUES ('Electronics', 3000.0);
        INSERT INTO sales (category, amount) VALUES ('Electronics', 2000.0);
        INSERT INTO sales (category, amount) VALUES ('Clothing', 1000.0);
        INSERT INTO sales (category, amount) VALUES ('Clothing', 2000.0);
        "#,
    )
    .unwrap();
    file
}
