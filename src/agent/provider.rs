//! Chat completion backend.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// A chat completion backend shared by the worker and critic models.
///
/// Implementations own transport concerns (auth, base URL, timeout).
/// Retries live one level up in [`super::LlmClassifier`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Runs one completion.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] on transport failure or timeout.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
