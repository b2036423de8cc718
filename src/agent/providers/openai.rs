//! OpenAI-compatible chat completions through `async-openai`.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    CreateChatCompletionResponse, ResponseFormat,
};
use async_trait::async_trait;
use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// Chat backend for the `OpenAI` API or any compatible server.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Creates a client from the configured key, base URL and timeout.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        let mut sdk_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base_url) = config.base_url.as_deref() {
            sdk_config = sdk_config.with_api_base(base_url);
        }
        Self {
            client: Client::with_config(sdk_config),
            timeout: config.timeout,
        }
    }
}

fn to_sdk_message(message: &ChatMessage) -> ChatCompletionRequestMessage {
    let text = message.content.clone();
    match message.role {
        Role::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(text),
            name: None,
        }),
        Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(text),
            name: None,
        }),
    }
}

/// Zero temperature is omitted so reasoning models that reject the field
/// still accept critic requests.
fn to_sdk_request(request: &ChatRequest) -> CreateChatCompletionRequest {
    CreateChatCompletionRequest {
        model: request.model.clone(),
        messages: request.messages.iter().map(to_sdk_message).collect(),
        temperature: request.temperature.filter(|t| *t > 0.0),
        max_completion_tokens: request.max_tokens,
        response_format: request.json_mode.then_some(ResponseFormat::JsonObject),
        ..Default::default()
    }
}

fn from_sdk_response(response: CreateChatCompletionResponse) -> ChatResponse {
    let usage = response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });
    let Some(choice) = response.choices.into_iter().next() else {
        return ChatResponse {
            usage,
            ..ChatResponse::default()
        };
    };
    ChatResponse {
        content: choice.message.content.unwrap_or_default(),
        usage,
        finish_reason: choice
            .finish_reason
            .map(|reason| format!("{reason:?}").to_lowercase()),
    }
}

/// Undecodable bodies are malformed output; everything else is transport.
fn request_error(err: OpenAIError) -> AgentError {
    match err {
        OpenAIError::JSONDeserialize(e) => AgentError::ResponseParse {
            message: e.to_string(),
            content: String::new(),
        },
        other => AgentError::ApiRequest {
            message: other.to_string(),
            status: None,
        },
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        debug!(model = %request.model, json = request.json_mode, "chat completion");
        let chat = self.client.chat();
        let call = chat.create(to_sdk_request(request));
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => Ok(from_sdk_response(response)),
            Ok(Err(err)) => Err(request_error(err)),
            Err(_) => Err(AgentError::ApiRequest {
                message: format!("no response within {}s", self.timeout.as_secs()),
                status: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critic_request_is_json_without_temperature() {
        let request = ChatRequest::new("gpt-4o", "grader", "grade this")
            .temperature(0.0)
            .max_tokens(100)
            .json(true);
        let built = to_sdk_request(&request);
        assert!(built.response_format.is_some());
        assert!(built.temperature.is_none());
        assert_eq!(built.max_completion_tokens, Some(100));
        assert!(matches!(built.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(built.messages[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_worker_request_keeps_temperature() {
        let request = ChatRequest::new("gpt-4o-mini", "analyst", "summarize").temperature(0.2);
        let built = to_sdk_request(&request);
        assert!(built.response_format.is_none());
        assert_eq!(built.temperature, Some(0.2));
        assert!(built.max_completion_tokens.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_request_error() {
        let config = AgentConfig::builder()
            .api_key("test")
            .base_url("http://127.0.0.1:9/v1")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = OpenAiProvider::new(&config);
        let result = provider
            .chat(&ChatRequest::new("gpt-4o-mini", "analyst", "ping"))
            .await;
        assert!(matches!(result, Err(AgentError::ApiRequest { status: None, .. })));
    }
}
