//! Scripted collaborators for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::classifier::TextClassifier;
use super::search::SearchProvider;
use crate::core::SearchHit;
use crate::error::AgentError;

type Responder = Box<dyn Fn(usize, &str) -> Result<String, AgentError> + Send + Sync>;

/// Text model that answers from a script and records every prompt.
pub struct ScriptedClassifier {
    respond: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new(
        respond: impl Fn(usize, &str) -> Result<String, AgentError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Replies in order, repeating the last entry once the script runs out.
    pub fn sequence(replies: Vec<&str>) -> Self {
        let replies: Vec<String> = replies.into_iter().map(String::from).collect();
        Self::new(move |n, _| {
            Ok(replies
                .get(n)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or_default())
        })
    }

    pub fn failing() -> Self {
        Self::new(|_, _| {
            Err(AgentError::ApiRequest {
                message: "connection refused".to_string(),
                status: None,
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextClassifier for ScriptedClassifier {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        (self.respond)(n, prompt)
    }
}

/// Search provider returning synthetic hits derived from the query.
pub struct StaticSearch {
    hits_per_query: usize,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn empty() -> Self {
        Self::with_hits(0)
    }

    pub fn with_hits(hits_per_query: usize) -> Self {
        Self {
            hits_per_query,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        (0..self.hits_per_query.min(num_results))
            .map(|i| {
                SearchHit::new(
                    format!("{query} result {i}"),
                    format!("https://example.com/{}/{i}", query.replace(' ', "-")),
                    format!("Snippet about {query} #{i}"),
                )
            })
            .collect()
    }
}
