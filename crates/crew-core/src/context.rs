//! Append-only context threaded through a pipeline run
//!
//! Each finished task appends its output; later tasks see every earlier
//! output verbatim and in order. Nothing is ever removed or rewritten.

use serde::{Deserialize, Serialize};

/// Output of one completed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Task name (e.g. "research")
    pub task: String,

    /// Role of the agent that produced it
    pub agent_role: String,

    /// The raw text answer
    pub text: String,
}

impl TaskOutput {
    /// Create a task output
    pub fn new(
        task: impl Into<String>,
        agent_role: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            task: task.into(),
            agent_role: agent_role.into(),
            text: text.into(),
        }
    }
}

/// Accumulated outputs of the tasks completed so far
///
/// # Example
///
/// ```
/// use crew_core::{TaskContext, TaskOutput};
///
/// let mut ctx = TaskContext::new();
/// ctx.push(TaskOutput::new("research", "Researcher", "AAPL looks strong."));
///
/// assert_eq!(ctx.len(), 1);
/// assert!(ctx.render().contains("AAPL looks strong."));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    outputs: Vec<TaskOutput>,
}

impl TaskContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed task's output
    pub fn push(&mut self, output: TaskOutput) {
        self.outputs.push(output);
    }

    /// All outputs in completion order
    pub fn outputs(&self) -> &[TaskOutput] {
        &self.outputs
    }

    /// Number of completed tasks
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether no task has completed yet
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Render every output as one text block for the next prompt
    ///
    /// Outputs are separated by a blank line and copied verbatim.
    pub fn render(&self) -> String {
        self.outputs
            .iter()
            .map(|o| o.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Consume the context, returning its outputs
    pub fn into_outputs(self) -> Vec<TaskOutput> {
        self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_only_order() {
        let mut ctx = TaskContext::new();
        assert!(ctx.is_empty());

        ctx.push(TaskOutput::new("research", "Researcher", "first"));
        ctx.push(TaskOutput::new("technical", "Analyst", "second"));

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.outputs()[0].text, "first");
    }

    #[test]
    fn test_render_is_verbatim() {
        let mut ctx = TaskContext::new();
        ctx.push(TaskOutput::new("a", "r", "  line one\nline two  "));
        ctx.push(TaskOutput::new("b", "r", "**bold**"));

        let rendered = ctx.render();
        assert!(rendered.contains("  line one\nline two  "));
        assert!(rendered.ends_with("**bold**"));
    }

    #[test]
    fn test_output_serialization() {
        let output = TaskOutput::new("report", "Strategist", "text");
        let json = serde_json::to_string(&output).unwrap();
        let back: TaskOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, output);
    }
}
