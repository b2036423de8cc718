//! Runtime settings for the research agents.
//!
//! Each setting resolves from an explicit builder call first, then an
//! `INTEL_*` environment variable, then a compiled-in default. The API key
//! is the only setting without a default.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Evaluator calls allowed per Deep Research run.
pub const DEFAULT_MAX_ITERATIONS: usize = 3;
/// Concurrent competitor analyses.
pub const DEFAULT_MAX_WORKERS: usize = 5;
const DEFAULT_RESULTS_PER_QUERY: usize = 5;
const DEFAULT_QUERIES_PER_PHASE: usize = 4;
const DEFAULT_MAX_FOLLOW_UPS: usize = 5;
const DEFAULT_WORKER_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CRITIC_MODEL: &str = "gpt-4o";
const DEFAULT_WORKER_MAX_TOKENS: u32 = 4096;
const DEFAULT_CRITIC_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Resolved agent settings.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Chat backend name, `openai` unless overridden.
    pub provider: String,
    /// Credential for the chat backend.
    pub api_key: String,
    /// Endpoint override for OpenAI-compatible servers.
    pub base_url: Option<String>,
    /// Model for planning, summarizing, grounded search and sentiment.
    pub worker_model: String,
    /// Model that grades findings.
    pub critic_model: String,
    /// Maximum evaluator calls per research run.
    pub max_iterations: usize,
    /// Concurrent workers for competitor analysis, at least 1.
    pub max_workers: usize,
    /// Results requested per search query.
    pub results_per_query: usize,
    /// Queries generated per investigation phase (clamped to 3..=4).
    pub queries_per_phase: usize,
    /// Follow-up queries accepted from a single evaluation.
    pub max_follow_ups: usize,
    /// Completion cap for the worker.
    pub worker_max_tokens: u32,
    /// Completion cap for the critic.
    pub critic_max_tokens: u32,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Retries after a failed model call.
    pub max_retries: u32,
    /// Pause between retries.
    pub retry_delay: Duration,
    /// Prompt template directory. Missing files use the built-in text.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Resolves everything from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] when neither `INTEL_API_KEY`
    /// nor `OPENAI_API_KEY` is set.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Query count per phase, clamped to the supported range.
    #[must_use]
    pub fn clamped_queries_per_phase(&self) -> usize {
        self.queries_per_phase.clamp(3, 4)
    }
}

/// Builder for [`AgentConfig`]. Unset fields fall through to defaults.
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    worker_model: Option<String>,
    critic_model: Option<String>,
    max_iterations: Option<usize>,
    max_workers: Option<usize>,
    results_per_query: Option<usize>,
    queries_per_phase: Option<usize>,
    max_follow_ups: Option<usize>,
    worker_max_tokens: Option<u32>,
    critic_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

/// First non-empty value among `keys`.
fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_first(&[key]).and_then(|v| v.trim().parse().ok())
}

impl AgentConfigBuilder {
    /// Fills every field still unset from `INTEL_*` variables.
    ///
    /// The key and base URL also accept the `OPENAI_*` names.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        self.provider = self.provider.or_else(|| env_first(&["INTEL_PROVIDER"]));
        self.api_key = self
            .api_key
            .or_else(|| env_first(&["INTEL_API_KEY", "OPENAI_API_KEY"]));
        self.base_url = self
            .base_url
            .or_else(|| env_first(&["INTEL_BASE_URL", "OPENAI_BASE_URL"]));
        self.worker_model = self.worker_model.or_else(|| env_first(&["INTEL_WORKER_MODEL"]));
        self.critic_model = self.critic_model.or_else(|| env_first(&["INTEL_CRITIC_MODEL"]));
        self.max_iterations = self.max_iterations.or_else(|| env_number("INTEL_MAX_ITERATIONS"));
        self.max_workers = self.max_workers.or_else(|| env_number("INTEL_MAX_WORKERS"));
        self.results_per_query = self
            .results_per_query
            .or_else(|| env_number("INTEL_RESULTS_PER_QUERY"));
        self.timeout = self
            .timeout
            .or_else(|| env_number("INTEL_TIMEOUT_SECS").map(Duration::from_secs));
        self.prompt_dir = self
            .prompt_dir
            .or_else(|| env_first(&["INTEL_PROMPT_DIR"]).map(PathBuf::from));
        self
    }

    /// Chat backend name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Backend credential.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Endpoint override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Model for the worker role.
    #[must_use]
    pub fn worker_model(mut self, model: impl Into<String>) -> Self {
        self.worker_model = Some(model.into());
        self
    }

    /// Model for the critic role.
    #[must_use]
    pub fn critic_model(mut self, model: impl Into<String>) -> Self {
        self.critic_model = Some(model.into());
        self
    }

    /// Refinement loop budget. Zero skips evaluation entirely.
    #[must_use]
    pub const fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Competitor analysis concurrency.
    #[must_use]
    pub const fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = Some(n);
        self
    }

    /// Results per search query.
    #[must_use]
    pub const fn results_per_query(mut self, n: usize) -> Self {
        self.results_per_query = Some(n);
        self
    }

    /// Queries per investigation phase.
    #[must_use]
    pub const fn queries_per_phase(mut self, n: usize) -> Self {
        self.queries_per_phase = Some(n);
        self
    }

    /// Follow-up queries kept from one evaluation.
    #[must_use]
    pub const fn max_follow_ups(mut self, n: usize) -> Self {
        self.max_follow_ups = Some(n);
        self
    }

    /// Worker completion cap.
    #[must_use]
    pub const fn worker_max_tokens(mut self, n: u32) -> Self {
        self.worker_max_tokens = Some(n);
        self
    }

    /// Critic completion cap.
    #[must_use]
    pub const fn critic_max_tokens(mut self, n: u32) -> Self {
        self.critic_max_tokens = Some(n);
        self
    }

    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Retries after the first failed attempt.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Pause between retries.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Resolves defaults and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no key was provided.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let Some(api_key) = self.api_key.filter(|k| !k.trim().is_empty()) else {
            return Err(AgentError::ApiKeyMissing);
        };

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            worker_model: self
                .worker_model
                .unwrap_or_else(|| DEFAULT_WORKER_MODEL.to_string()),
            critic_model: self
                .critic_model
                .unwrap_or_else(|| DEFAULT_CRITIC_MODEL.to_string()),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            max_workers: self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS).max(1),
            results_per_query: self
                .results_per_query
                .unwrap_or(DEFAULT_RESULTS_PER_QUERY)
                .max(1),
            queries_per_phase: self.queries_per_phase.unwrap_or(DEFAULT_QUERIES_PER_PHASE),
            max_follow_ups: self.max_follow_ups.unwrap_or(DEFAULT_MAX_FOLLOW_UPS),
            worker_max_tokens: self.worker_max_tokens.unwrap_or(DEFAULT_WORKER_MAX_TOKENS),
            critic_max_tokens: self.critic_max_tokens.unwrap_or(DEFAULT_CRITIC_MAX_TOKENS),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_only_key_given() {
        let config = AgentConfig::builder()
            .api_key("sk-test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.max_workers, DEFAULT_MAX_WORKERS);
        assert_eq!(config.results_per_query, 5);
        assert_eq!(config.max_follow_ups, 5);
        assert_eq!(config.worker_model, DEFAULT_WORKER_MODEL);
        assert_eq!(config.critic_model, DEFAULT_CRITIC_MODEL);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.clamped_queries_per_phase(), 4);
    }

    #[test]
    fn test_missing_or_blank_key_rejected() {
        assert!(matches!(AgentConfig::builder().build(), Err(AgentError::ApiKeyMissing)));
        assert!(matches!(
            AgentConfig::builder().api_key("  ").build(),
            Err(AgentError::ApiKeyMissing)
        ));
    }

    #[test]
    fn test_explicit_values_and_clamping() {
        let config = AgentConfig::builder()
            .api_key("sk-test")
            .critic_model("gpt-4.1")
            .max_iterations(0)
            .max_workers(0)
            .results_per_query(0)
            .queries_per_phase(1)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.critic_model, "gpt-4.1");
        assert_eq!(config.max_iterations, 0);
        assert_eq!(config.max_workers, 1);
        assert_eq!(config.results_per_query, 1);
        assert_eq!(config.clamped_queries_per_phase(), 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_explicit_values_win_over_environment() {
        let config = AgentConfig::builder()
            .api_key("explicit")
            .max_iterations(7)
            .from_env()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.api_key, "explicit");
        assert_eq!(config.max_iterations, 7);
    }

    #[test]
    fn test_env_first_skips_unset() {
        assert_eq!(env_first(&["DEEP_INTEL_TEST_UNSET_VARIABLE"]), None);
    }
}
