//! Role agents backed by the executor loop

use crate::executor::{AgentExecutor, AgentExecutorBuilder};
use crate::RunObserver;
use async_trait::async_trait;
use crew_core::{Agent, AgentOutput, Error, Result};
use crew_llm::{BackendSpec, LLMProvider};
use crew_prompt::PromptBuilder;
use crew_tools::ToolRegistry;
use std::sync::Arc;

/// An agent defined by a role, a goal and a backstory
///
/// The three are folded into the system prompt; the agent's tools are
/// advertised to the model on every round.
pub struct CrewAgent {
    role: String,
    goal: String,
    backstory: String,
    executor: AgentExecutor,
}

impl CrewAgent {
    /// Create a builder
    pub fn builder() -> CrewAgentBuilder {
        CrewAgentBuilder::default()
    }

    /// Agent goal
    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// Agent backstory
    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    /// Names of the tools this agent may call
    pub fn tool_names(&self) -> Vec<&str> {
        self.executor.tools().names()
    }

    /// The system prompt sent with every request
    pub fn system_prompt(&self) -> &str {
        self.executor.config().system_prompt.as_deref().unwrap_or_default()
    }
}

#[async_trait]
impl Agent for CrewAgent {
    async fn perform(&self, prompt: String) -> Result<AgentOutput> {
        self.executor.run(prompt).await
    }

    fn role(&self) -> &str {
        &self.role
    }
}

impl std::fmt::Debug for CrewAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrewAgent")
            .field("role", &self.role)
            .field("tools", &self.tool_names())
            .finish_non_exhaustive()
    }
}

/// Compose the system prompt from the persona and tool list
pub fn compose_system_prompt(
    role: &str,
    goal: &str,
    backstory: &str,
    tools: &ToolRegistry,
) -> String {
    let tool_lines: Vec<String> = tools
        .definitions()
        .into_iter()
        .map(|d| format!("{}: {}", d.name, d.description))
        .collect();

    PromptBuilder::new()
        .text(format!("You are {role}. {backstory}"))
        .blank_line()
        .text(format!("Your personal goal is: {goal}"))
        .newline()
        .when(
            !tool_lines.is_empty(),
            "\nYou have access to the following tools and should call them whenever you need data:\n",
        )
        .bullets(tool_lines)
        .newline()
        .text("When you are done, reply with your complete final answer only. It must fully meet the expected output criteria.")
        .build()
}

/// Builder for [`CrewAgent`]
#[derive(Default)]
pub struct CrewAgentBuilder {
    role: Option<String>,
    goal: Option<String>,
    backstory: String,
    provider: Option<Arc<dyn LLMProvider>>,
    backend: Option<BackendSpec>,
    tools: ToolRegistry,
    max_iterations: Option<usize>,
    max_tokens: Option<usize>,
    observer: Option<Arc<dyn RunObserver>>,
}

impl CrewAgentBuilder {
    /// Set the role name
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the goal (already rendered for the run)
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    /// Set the backstory
    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model backend (model name and temperature)
    pub fn backend(mut self, backend: BackendSpec) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the tools this agent may call
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Set maximum tool rounds
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the run observer
    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<CrewAgent> {
        let role = self
            .role
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| Error::InitializationFailed("agent role not set".to_string()))?;
        let goal = self
            .goal
            .ok_or_else(|| Error::InitializationFailed(format!("agent '{role}' has no goal")))?;
        let backend = self
            .backend
            .ok_or_else(|| Error::InitializationFailed(format!("agent '{role}' has no backend")))?;
        let provider = self.provider.ok_or_else(|| {
            Error::InitializationFailed(format!("agent '{role}' has no provider"))
        })?;

        let system_prompt = compose_system_prompt(&role, &goal, &self.backstory, &self.tools);

        let mut builder = AgentExecutorBuilder::new()
            .provider(provider)
            .tool_registry(Arc::new(self.tools))
            .model(backend.model)
            .temperature(backend.temperature)
            .system_prompt(system_prompt);
        if let Some(max) = self.max_iterations {
            builder = builder.max_iterations(max);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        let mut executor = builder.build()?.with_label(role.clone());
        if let Some(observer) = self.observer {
            executor = executor.with_observer(observer);
        }

        Ok(CrewAgent {
            role,
            goal,
            backstory: self.backstory,
            executor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EchoTool, ScriptedProvider};
    use crew_llm::ModelChoice;

    fn tools() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        registry
    }

    #[test]
    fn test_system_prompt_composition() {
        let agent = CrewAgent::builder()
            .role("Expert Technical Analyst")
            .goal("Perform an in-depth technical analysis on AAPL")
            .backstory("You read charts.")
            .provider(Arc::new(ScriptedProvider::new(vec![])))
            .backend(ModelChoice::Llama31_8b.spec())
            .tools(tools())
            .build()
            .unwrap();

        let prompt = agent.system_prompt();
        assert!(prompt.starts_with("You are Expert Technical Analyst. You read charts."));
        assert!(prompt.contains("Your personal goal is: Perform an in-depth technical analysis on AAPL"));
        assert!(prompt.contains("- echo: Echo a value"));
        assert_eq!(agent.tool_names(), vec!["echo"]);
    }

    #[test]
    fn test_missing_parts_fail() {
        let result = CrewAgent::builder()
            .role("Researcher")
            .goal("g")
            .backend(ModelChoice::Gpt4oMini.spec())
            .build();
        assert!(matches!(result, Err(Error::InitializationFailed(_))));

        let result = CrewAgent::builder().goal("g").build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_perform_uses_backend() {
        let provider = Arc::new(ScriptedProvider::new(vec![ScriptedProvider::text(
            "Report body",
            3,
            2,
        )]));
        let agent = CrewAgent::builder()
            .role("Chief Investment Strategist")
            .goal("Synthesize")
            .provider(provider.clone())
            .backend(ModelChoice::Llama31_70b.spec())
            .build()
            .unwrap();

        let output = agent.perform("Write it".to_string()).await.unwrap();
        assert_eq!(output.text, "Report body");
        assert_eq!(agent.role(), "Chief Investment Strategist");

        let request = &provider.requests()[0];
        assert_eq!(request.model, "llama-3.1-70b-versatile");
        assert!(request.system.as_deref().unwrap_or_default().contains("Synthesize"));
    }
}
