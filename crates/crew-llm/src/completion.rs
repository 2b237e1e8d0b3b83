//! One chat round: what an agent sends and what comes back

use crate::{BackendSpec, Message, ToolDefinition};
use crew_core::TokenUsage;
use serde::{Deserialize, Serialize};

/// Completion budget used when a caller does not set one
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// A full conversation sent to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,

    /// Persona prompt; sent ahead of `messages`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Tools the model may call this round. `None` forces a text answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl CompletionRequest {
    /// Start a request for a bare model id
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder {
            request: Self {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: None,
                tools: None,
            },
        }
    }

    /// Start a request carrying a backend's model and temperature
    pub fn for_backend(backend: &BackendSpec) -> CompletionRequestBuilder {
        Self::builder(backend.model.clone()).temperature(backend.temperature)
    }

    /// Whether the model is offered any tools
    pub fn offers_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// What the provider returned for one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Answer text, empty when the model only called tools
    pub fn text(&self) -> String {
        self.message.text().unwrap_or_default()
    }

    /// The model ran out of completion budget
    pub fn truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
}

/// Fluent construction of a [`CompletionRequest`]
#[derive(Debug, Clone)]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    /// Replace the conversation
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.request.messages = messages;
        self
    }

    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    /// Offer tools; an empty list leaves the field unset
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.request.tools = (!tools.is_empty()).then_some(tools);
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelChoice;
    use serde_json::json;

    #[test]
    fn test_backend_sets_model_and_temperature() {
        let backend = ModelChoice::Llama31_8b.spec();
        let request = CompletionRequest::for_backend(&backend)
            .add_message(Message::user("Research AAPL"))
            .system("You are a Stock Market Researcher.")
            .max_tokens(2048)
            .build();

        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.messages.len(), 1);
        assert!(!request.offers_tools());
    }

    #[test]
    fn test_default_budget() {
        let request = CompletionRequest::builder("gpt-4o-mini").build();
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_empty_tools_stay_unset() {
        let request = CompletionRequest::builder("m").tools(Vec::new()).build();
        assert!(request.tools.is_none());

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_offered_tools() {
        let definition = ToolDefinition::new(
            "search_news",
            "Search news articles",
            json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        );
        let request = CompletionRequest::builder("m")
            .tools(vec![definition])
            .build();
        assert!(request.offers_tools());
    }

    #[test]
    fn test_truncated_response() {
        let response = CompletionResponse {
            message: Message::assistant("partial"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage::new(10, 4096),
        };
        assert!(response.truncated());
        assert_eq!(response.text(), "partial");
    }
}
