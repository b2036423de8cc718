//! Provider selection.

use std::sync::Arc;

use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::AgentError;

/// Provider names accepted for OpenAI-compatible endpoints.
const OPENAI_NAMES: [&str; 3] = ["openai", "openai-compatible", "compatible"];

/// Builds the chat backend named by `config.provider`.
///
/// Names are matched case-insensitively. Any OpenAI-compatible server
/// (vLLM, Ollama, a gateway) is reached through `openai` plus a base URL.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown names.
pub fn create_provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    let name = config.provider.trim().to_lowercase();
    if OPENAI_NAMES.contains(&name.as_str()) {
        debug!(
            provider = %name,
            base_url = config.base_url.as_deref().unwrap_or("default"),
            "creating chat provider"
        );
        return Ok(Arc::new(OpenAiProvider::new(config)));
    }
    Err(AgentError::UnsupportedProvider {
        name: config.provider.clone(),
    })
}
