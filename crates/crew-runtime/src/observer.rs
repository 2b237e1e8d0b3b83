//! Run observer hooks

use async_trait::async_trait;
use crew_core::TokenUsage;
use crew_tools::ToolOutcome;
use serde_json::Value;

/// Receives step-by-step events while a pipeline runs
///
/// Every hook has an empty default so implementors pick what they need.
#[async_trait]
pub trait RunObserver: Send + Sync {
    /// A task is about to be handed to its agent
    async fn on_task_start(&self, _task: &str, _role: &str, _prompt: &str) {}

    /// One model round finished
    async fn on_llm_round(&self, _role: &str, _iteration: usize, _usage: TokenUsage) {}

    /// A tool call is starting
    async fn on_tool_start(&self, _role: &str, _tool: &str, _input: &Value) {}

    /// A tool call finished; `rendered` is the text the model will see
    async fn on_tool_done(
        &self,
        _role: &str,
        _tool: &str,
        _outcome: &ToolOutcome,
        _rendered: &str,
        _duration_ms: u64,
    ) {
    }

    /// A task produced its output
    async fn on_task_done(&self, _task: &str, _role: &str, _output: &str) {}
}

/// Observer that ignores every event
pub struct NoOpObserver;

#[async_trait]
impl RunObserver for NoOpObserver {}
