//! Text generation capability used by every stage.
//!
//! Stages only see [`TextClassifier`]: a rendered prompt goes in, free
//! text comes out. [`LlmClassifier`] backs it with an [`LlmProvider`] and
//! retries transport failures before giving up.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::config::AgentConfig;
use super::message::ChatRequest;
use super::provider::LlmProvider;
use crate::error::AgentError;

/// A generative model that turns a prompt into text.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Generates a completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport failure or after exhausting
    /// retries. Callers are expected to recover.
    async fn generate(&self, prompt: &str) -> Result<String, AgentError>;
}

/// [`TextClassifier`] backed by a chat completion provider.
pub struct LlmClassifier {
    provider: Arc<dyn LlmProvider>,
    role: &'static str,
    model: String,
    system_prompt: String,
    json_mode: bool,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    retry_delay: Duration,
    tokens_used: AtomicU64,
}

impl LlmClassifier {
    /// Worker role: planning, summaries, grounded search, sentiment.
    #[must_use]
    pub fn worker(provider: Arc<dyn LlmProvider>, config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            provider,
            role: "worker",
            model: config.worker_model.clone(),
            system_prompt,
            json_mode: false,
            temperature: 0.2,
            max_tokens: config.worker_max_tokens,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            tokens_used: AtomicU64::new(0),
        }
    }

    /// Critic role: deterministic JSON grading.
    #[must_use]
    pub fn critic(provider: Arc<dyn LlmProvider>, config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            provider,
            role: "critic",
            model: config.critic_model.clone(),
            system_prompt,
            json_mode: true,
            temperature: 0.0,
            max_tokens: config.critic_max_tokens,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            tokens_used: AtomicU64::new(0),
        }
    }

    /// Total tokens reported by the provider so far.
    pub fn tokens_used(&self) -> u64 {
        self.tokens_used.load(Ordering::Relaxed)
    }

    /// Role name, `worker` or `critic`.
    #[must_use]
    pub const fn role(&self) -> &'static str {
        self.role
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest::new(self.model.as_str(), &self.system_prompt, prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .json(self.json_mode)
    }
}

impl std::fmt::Debug for LlmClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClassifier")
            .field("provider", &self.provider.name())
            .field("role", &self.role)
            .field("model", &self.model)
            .field("json_mode", &self.json_mode)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextClassifier for LlmClassifier {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        let request = self.request(prompt);
        let attempts = self.max_retries.saturating_add(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.provider.chat(&request).await {
                Ok(response) => {
                    if response.is_truncated() {
                        warn!(role = self.role, max_tokens = self.max_tokens, "model output truncated");
                    }
                    self.tokens_used
                        .fetch_add(u64::from(response.usage.total_tokens), Ordering::Relaxed);
                    debug!(
                        role = self.role,
                        attempt,
                        tokens = response.usage.total_tokens,
                        finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
                        "model call completed"
                    );
                    return Ok(response.content);
                }
                Err(e @ AgentError::ApiRequest { .. }) => {
                    warn!(role = self.role, attempt, error = %e, "model call failed");
                    last_error = Some(e);
                    if attempt < attempts && !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        match last_error {
            Some(e) if attempts == 1 => Err(e),
            Some(e) => Err(AgentError::RetriesExhausted {
                attempts,
                message: e.to_string(),
            }),
            None => Err(AgentError::Orchestration {
                message: "no model call attempted".to_string(),
            }),
        }
    }
}
