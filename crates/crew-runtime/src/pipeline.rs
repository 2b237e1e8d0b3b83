//! Sequential task pipeline

use crate::{RunObserver, Task};
use crew_core::{Error, Result, TaskContext, TaskOutput, TokenUsage};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Result of a completed pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    /// Every task output, in execution order
    pub outputs: Vec<TaskOutput>,
    /// Usage summed over every completion of every task
    pub usage: TokenUsage,
}

impl PipelineOutcome {
    /// Output of the last task
    pub fn final_output(&self) -> Option<&TaskOutput> {
        self.outputs.last()
    }
}

/// Runs tasks strictly in order
///
/// Task N+1 starts only after task N's output has been appended to the
/// shared context. There is no retry at this layer.
pub struct Pipeline {
    tasks: Vec<Task>,
    observer: Option<Arc<dyn RunObserver>>,
}

impl Pipeline {
    /// Create a pipeline over the given tasks
    pub fn new(tasks: Vec<Task>) -> Result<Self> {
        if tasks.is_empty() {
            return Err(Error::Configuration("pipeline has no tasks".to_string()));
        }
        Ok(Self {
            tasks,
            observer: None,
        })
    }

    /// Set the observer receiving task events
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run every task with the given template variables
    ///
    /// Fails on the first agent error or empty answer.
    #[instrument(skip_all, fields(tasks = self.tasks.len()))]
    pub async fn run<S: Serialize + Sync>(&self, vars: &S) -> Result<PipelineOutcome> {
        let mut context = TaskContext::new();
        let mut usage = TokenUsage::default();

        for task in &self.tasks {
            let role = task.agent().role().to_string();
            let prompt = task.prompt(vars, &context)?;

            info!(task = %task.name(), role = %role, "Task started");
            if let Some(observer) = &self.observer {
                observer.on_task_start(task.name(), &role, &prompt).await;
            }

            let start = Instant::now();
            let output = task.agent().perform(prompt).await?;
            usage += output.usage;

            if output.text.trim().is_empty() {
                return Err(Error::ProcessingFailed(format!(
                    "task '{}' ({role}) produced an empty answer",
                    task.name()
                )));
            }

            info!(
                task = %task.name(),
                duration_ms = start.elapsed().as_millis() as u64,
                output_length = output.text.len(),
                total_tokens = usage.total(),
                "Task completed"
            );
            if let Some(observer) = &self.observer {
                observer.on_task_done(task.name(), &role, &output.text).await;
            }

            context.push(TaskOutput::new(task.name(), role, output.text));
        }

        Ok(PipelineOutcome {
            outputs: context.into_outputs(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingObserver, ScriptedAgent};
    use crew_prompt::TaskTemplate;
    use serde_json::json;

    fn task(name: &str, agent: Arc<ScriptedAgent>) -> Task {
        Task::new(
            name,
            TaskTemplate::new(name, format!("{name} for {{{{ stock_symbol }}}}"), &["stock_symbol"])
                .unwrap(),
            "text",
            agent,
        )
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        assert!(Pipeline::new(vec![]).is_err());
    }

    #[tokio::test]
    async fn test_outputs_flow_forward_verbatim() {
        let a = Arc::new(ScriptedAgent::new("A", "alpha output", TokenUsage::new(10, 1)));
        let b = Arc::new(ScriptedAgent::new("B", "beta output", TokenUsage::new(20, 2)));
        let c = Arc::new(ScriptedAgent::new("C", "gamma output", TokenUsage::new(30, 3)));
        let observer = Arc::new(RecordingObserver::default());

        let pipeline = Pipeline::new(vec![
            task("one", a.clone()),
            task("two", b.clone()),
            task("three", c.clone()),
        ])
        .unwrap()
        .with_observer(observer.clone());

        let outcome = pipeline.run(&json!({"stock_symbol": "ACME"})).await.unwrap();

        assert_eq!(outcome.outputs.len(), 3);
        assert_eq!(outcome.final_output().unwrap().text, "gamma output");
        assert_eq!(outcome.usage, TokenUsage::new(60, 6));

        assert!(a.prompts()[0].starts_with("one for ACME"));
        assert!(!a.prompts()[0].contains("alpha output"));
        assert!(b.prompts()[0].contains("alpha output"));
        assert!(c.prompts()[0].contains("alpha output\n\nbeta output"));

        let events = observer.events();
        assert_eq!(events[0], "task_start:one:A");
        assert_eq!(events.last().unwrap(), "task_done:three:gamma output");
    }

    #[tokio::test]
    async fn test_empty_answer_stops_pipeline() {
        let a = Arc::new(ScriptedAgent::new("A", "  ", TokenUsage::default()));
        let b = Arc::new(ScriptedAgent::new("B", "never", TokenUsage::default()));
        let pipeline = Pipeline::new(vec![task("one", a), task("two", b.clone())]).unwrap();

        let err = pipeline
            .run(&json!({"stock_symbol": "ACME"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProcessingFailed(_)));
        assert!(b.prompts().is_empty());
    }
}
