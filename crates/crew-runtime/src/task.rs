//! Pipeline tasks

use crew_core::{Agent, Result, TaskContext};
use crew_prompt::{PromptBuilder, TaskTemplate};
use serde::Serialize;
use std::sync::Arc;

/// Heading that introduces earlier task outputs in a prompt
pub const CONTEXT_HEADING: &str = "This is the context you're working with:";

/// One step of a pipeline: a description template owned by an agent
#[derive(Clone)]
pub struct Task {
    name: String,
    description: TaskTemplate,
    expected_output: String,
    agent: Arc<dyn Agent>,
}

impl Task {
    /// Create a task
    pub fn new(
        name: impl Into<String>,
        description: TaskTemplate,
        expected_output: impl Into<String>,
        agent: Arc<dyn Agent>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            expected_output: expected_output.into(),
            agent,
        }
    }

    /// Task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected output criteria
    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    /// Owning agent
    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    /// Full prompt for this task
    ///
    /// Rendered description, the expected-output line, then every earlier
    /// output verbatim when there is any.
    pub fn prompt<S: Serialize>(&self, vars: &S, context: &TaskContext) -> Result<String> {
        let description = self.description.render(vars)?;

        Ok(PromptBuilder::new()
            .text(description.trim_end())
            .blank_line()
            .text(format!("Expected output: {}", self.expected_output))
            .when(
                !context.is_empty(),
                format!("\n\n{CONTEXT_HEADING}\n{}", context.render()),
            )
            .build())
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("agent", &self.agent.role())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAgent;
    use crew_core::{TaskOutput, TokenUsage};
    use serde_json::json;

    fn task() -> Task {
        Task::new(
            "technical",
            TaskTemplate::new("technical", "Analyze {{ stock_symbol }}.\n", &["stock_symbol"])
                .unwrap(),
            "A short report.",
            Arc::new(ScriptedAgent::new("Analyst", "ok", TokenUsage::default())),
        )
    }

    #[test]
    fn test_first_task_prompt_has_no_context() {
        let prompt = task()
            .prompt(&json!({"stock_symbol": "ACME"}), &TaskContext::new())
            .unwrap();
        assert_eq!(prompt, "Analyze ACME.\n\nExpected output: A short report.");
    }

    #[test]
    fn test_context_is_verbatim() {
        let mut context = TaskContext::new();
        context.push(TaskOutput::new("research", "Researcher", "Line A\n  Line B"));
        let prompt = task()
            .prompt(&json!({"stock_symbol": "ACME"}), &context)
            .unwrap();
        assert!(prompt.ends_with(&format!("{CONTEXT_HEADING}\nLine A\n  Line B")));
    }

    #[test]
    fn test_missing_variable_fails() {
        let err = task().prompt(&json!({}), &TaskContext::new()).unwrap_err();
        assert!(matches!(err, crew_core::Error::Template(_)));
    }
}
