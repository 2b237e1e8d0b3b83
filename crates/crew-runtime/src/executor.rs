//! Agent executor for running agent loops
//!
//! The loop:
//! 1. Call the LLM with the conversation and the agent's tools
//! 2. If the reply requests tools, invoke them, append the results, loop
//! 3. Otherwise return the reply text
//!
//! When `max_iterations` rounds pass without a final answer, one last call
//! is made without tools, asking the model to answer from what it has.

use crate::RunObserver;
use crew_core::{AgentOutput, Result, TokenUsage};
use crew_llm::{CompletionRequest, LLMProvider, Message, ToolCall};
use crew_tools::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sent when the iteration budget runs out
pub const FINAL_ANSWER_NUDGE: &str = "You have reached the maximum number of tool calls. \
Using the information gathered so far, give your final answer now.";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum tool rounds before the forced final answer
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.1),
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    label: String,
    observer: Option<Arc<dyn RunObserver>>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            label: "agent".to_string(),
            observer: None,
        }
    }

    /// Create a builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Name reported to the observer (usually the agent role)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the observer receiving LLM and tool events
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Run the loop for one prompt
    ///
    /// The returned usage covers every completion made for this prompt.
    pub async fn run(&self, user_message: String) -> Result<AgentOutput> {
        let mut conversation = vec![Message::user(user_message)];
        let mut usage = TokenUsage::default();

        for iteration in 1..=self.config.max_iterations {
            info!(
                agent = %self.label,
                iteration,
                max_iterations = self.config.max_iterations,
                "Agent iteration started"
            );

            let request = self.request(conversation.clone(), true);
            let response = self.provider.complete(request).await?;
            usage += response.usage;
            self.notify_round(iteration, response.usage).await;

            info!(
                agent = %self.label,
                stop_reason = ?response.stop_reason,
                prompt_tokens = response.usage.prompt_tokens,
                completion_tokens = response.usage.completion_tokens,
                "LLM response received"
            );

            if response.message.has_tool_calls() {
                let results = self.execute_tools(&response.message).await;
                conversation.push(response.message);
                conversation.extend(results);
                continue;
            }

            if response.truncated() {
                warn!(agent = %self.label, "Response truncated at max tokens");
            }

            let text = response.text();
            info!(
                agent = %self.label,
                iteration,
                response_length = text.len(),
                "Agent completed"
            );
            return Ok(AgentOutput::new(text, usage));
        }

        warn!(
            agent = %self.label,
            max_iterations = self.config.max_iterations,
            "Max iterations reached, requesting final answer"
        );
        conversation.push(Message::user(FINAL_ANSWER_NUDGE));
        let response = self.provider.complete(self.request(conversation, false)).await?;
        usage += response.usage;
        self.notify_round(self.config.max_iterations + 1, response.usage)
            .await;

        Ok(AgentOutput::new(response.text(), usage))
    }

    fn request(&self, conversation: Vec<Message>, with_tools: bool) -> CompletionRequest {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation)
            .system(
                self.config
                    .system_prompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            )
            .max_tokens(self.config.max_tokens);

        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        if with_tools {
            builder = builder.tools(self.tool_registry.definitions());
        }
        builder.build()
    }

    async fn notify_round(&self, iteration: usize, usage: TokenUsage) {
        if let Some(observer) = &self.observer {
            observer.on_llm_round(&self.label, iteration, usage).await;
        }
    }

    /// Invoke every tool call in an assistant message, in order
    ///
    /// Unknown tools and failed calls become error results for the model;
    /// nothing here aborts the loop.
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for ToolCall { id, name, input } in message.tool_calls() {
            let input_preview: String = input.to_string().chars().take(500).collect();
            info!(
                agent = %self.label,
                tool_name = %name,
                tool_id = %id,
                input_preview = %input_preview,
                "Executing tool"
            );
            if let Some(observer) = &self.observer {
                observer.on_tool_start(&self.label, name, input).await;
            }

            let Some(tool) = self.tool_registry.get(name) else {
                warn!(agent = %self.label, tool_name = %name, "Tool not found");
                results.push(Message::tool_error(
                    id,
                    format!(
                        "Tool '{name}' is not available. Available tools: {}",
                        self.tool_registry.names().join(", ")
                    ),
                ));
                continue;
            };

            let start_time = Instant::now();
            let outcome = tool.invoke(input.clone()).await;
            let duration_ms = start_time.elapsed().as_millis() as u64;
            let rendered = outcome.render(name);

            if outcome.is_success() {
                info!(
                    tool_name = %name,
                    duration_ms,
                    result_length = rendered.len(),
                    "Tool execution succeeded"
                );
            } else {
                warn!(
                    tool_name = %name,
                    duration_ms,
                    error = %rendered,
                    "Tool execution failed"
                );
            }
            debug!(tool_name = %name, result = %rendered, "Tool result");

            if let Some(observer) = &self.observer {
                observer
                    .on_tool_done(&self.label, name, &outcome, &rendered, duration_ms)
                    .await;
            }

            results.push(if outcome.is_success() {
                Message::tool_result(id, rendered)
            } else {
                Message::tool_error(id, rendered)
            });
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            crew_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        if self.config.max_iterations == 0 {
            return Err(crew_core::Error::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EchoTool, FailingTool, RecordingObserver, ScriptedProvider};
    use crew_llm::ContentBlock;
    use serde_json::json;

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        registry.register(Arc::new(FailingTool)).unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(AgentExecutorBuilder::new().build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_iterations() {
        let result = AgentExecutor::builder()
            .provider(Arc::new(ScriptedProvider::new(vec![])))
            .max_iterations(0)
            .build();
        assert!(matches!(result, Err(crew_core::Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![ScriptedProvider::text(
            "All done", 10, 5,
        )]));
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .model("test-model")
            .temperature(0.1)
            .build()
            .unwrap();

        let output = executor.run("Hi".to_string()).await.unwrap();
        assert_eq!(output.text, "All done");
        assert_eq!(output.usage, TokenUsage::new(10, 5));

        let requests = provider.requests();
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].temperature, Some(0.1));
        assert!(requests[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_tool_round_trip_accumulates_usage() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::tool_call("call_1", "echo", json!({"value": "ping"}), 20, 4),
            ScriptedProvider::text("Final: ping", 30, 6),
        ]));
        let observer = Arc::new(RecordingObserver::default());
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .tool_registry(registry())
            .build()
            .unwrap()
            .with_label("Researcher")
            .with_observer(observer.clone());

        let output = executor.run("Look it up".to_string()).await.unwrap();
        assert_eq!(output.text, "Final: ping");
        assert_eq!(output.usage, TokenUsage::new(50, 10));

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(2));
        // user, assistant tool call, tool result
        assert_eq!(requests[1].messages.len(), 3);

        let events = observer.events();
        assert!(events.contains(&"tool_start:Researcher:echo".to_string()));
        assert!(events.contains(&"tool_done:Researcher:echo:ping".to_string()));
    }

    #[tokio::test]
    async fn test_unparseable_arguments_become_tool_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::tool_call("call_1", "echo", json!("{\"value\": \"pi"), 5, 2),
            ScriptedProvider::text("Retried without the tool", 6, 3),
        ]));
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .tool_registry(registry())
            .build()
            .unwrap();

        let output = executor.run("Go".to_string()).await.unwrap();
        assert_eq!(output.text, "Retried without the tool");
        assert_eq!(output.usage, TokenUsage::new(11, 5));

        let requests = provider.requests();
        match &requests[1].messages[2].content {
            Some(crew_llm::MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => {
                    assert_eq!(*is_error, Some(true));
                    assert!(content.contains("invalid input"));
                }
                other => panic!("unexpected block: {other:?}"),
            },
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_and_unknown_tools_do_not_abort() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::tool_call("call_1", "always_fails", json!({}), 1, 1),
            ScriptedProvider::tool_call("call_2", "no_such_tool", json!({}), 1, 1),
            ScriptedProvider::text("Recovered", 1, 1),
        ]));
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .tool_registry(registry())
            .build()
            .unwrap();

        let output = executor.run("Go".to_string()).await.unwrap();
        assert_eq!(output.text, "Recovered");

        let requests = provider.requests();
        let failure = &requests[1].messages[2];
        match &failure.content {
            Some(crew_llm::MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => {
                    assert_eq!(*is_error, Some(true));
                    assert!(content.starts_with("Tool 'always_fails' failed"));
                }
                other => panic!("unexpected block: {other:?}"),
            },
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_iteration_budget_forces_final_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::tool_call("c1", "echo", json!({"value": "a"}), 1, 1),
            ScriptedProvider::tool_call("c2", "echo", json!({"value": "b"}), 1, 1),
            ScriptedProvider::text("Best effort answer", 1, 1),
        ]));
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .tool_registry(registry())
            .max_iterations(2)
            .build()
            .unwrap();

        let output = executor.run("Loop".to_string()).await.unwrap();
        assert_eq!(output.text, "Best effort answer");
        assert_eq!(output.usage.total(), 6);

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].tools.is_none());
        assert_eq!(
            requests[2].messages.last().and_then(Message::text).as_deref(),
            Some(FINAL_ANSWER_NUDGE)
        );
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let executor = AgentExecutor::builder().provider(provider).build().unwrap();
        let err = executor.run("Hi".to_string()).await.unwrap_err();
        assert!(matches!(err, crew_core::Error::Llm(_)));
    }
}
