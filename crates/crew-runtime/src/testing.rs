//! Fakes shared by the runtime tests

use crate::RunObserver;
use async_trait::async_trait;
use crew_core::{Agent, AgentOutput, TokenUsage};
use crew_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    StopReason,
};
use crew_tools::{Tool, ToolFailure, ToolOutcome};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider that replays canned responses and records requests
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str, prompt: usize, completion: usize) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::new(prompt, completion),
        }
    }

    pub fn tool_call(
        id: &str,
        name: &str,
        input: Value,
        prompt: usize,
        completion: usize,
    ) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::new(prompt, completion),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> crew_llm::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LLMError::RequestFailed("script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Returns its `value` argument as text
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    async fn invoke(&self, input: Value) -> ToolOutcome {
        match crew_tools::params::required_str(&input, "value") {
            Ok(value) => ToolOutcome::text(value),
            Err(failure) => failure.into(),
        }
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo a value"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"value": {"type": "string"}}})
    }
}

/// Always reports an upstream failure
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    async fn invoke(&self, _input: Value) -> ToolOutcome {
        ToolFailure::upstream("service unavailable").into()
    }

    fn name(&self) -> &str {
        "always_fails"
    }

    fn description(&self) -> &str {
        "Fails"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object"})
    }
}

/// Records events as compact strings
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl RunObserver for RecordingObserver {
    async fn on_task_start(&self, task: &str, role: &str, _prompt: &str) {
        self.record(format!("task_start:{task}:{role}"));
    }

    async fn on_tool_start(&self, role: &str, tool: &str, _input: &Value) {
        self.record(format!("tool_start:{role}:{tool}"));
    }

    async fn on_tool_done(
        &self,
        role: &str,
        tool: &str,
        _outcome: &ToolOutcome,
        rendered: &str,
        _duration_ms: u64,
    ) {
        self.record(format!("tool_done:{role}:{tool}:{rendered}"));
    }

    async fn on_task_done(&self, task: &str, _role: &str, output: &str) {
        self.record(format!("task_done:{task}:{output}"));
    }
}

/// Agent that answers with a fixed reply and records prompts
pub struct ScriptedAgent {
    role: String,
    reply: String,
    usage: TokenUsage,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    pub fn new(role: &str, reply: &str, usage: TokenUsage) -> Self {
        Self {
            role: role.to_string(),
            reply: reply.to_string(),
            usage,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn perform(&self, prompt: String) -> crew_core::Result<AgentOutput> {
        self.prompts.lock().unwrap().push(prompt);
        Ok(AgentOutput::new(self.reply.clone(), self.usage))
    }

    fn role(&self) -> &str {
        &self.role
    }
}
