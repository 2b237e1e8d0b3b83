//! Fakes shared by the crate's tests

use async_trait::async_trait;
use crew_core::TokenUsage;
use crew_llm::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason,
};
use crew_tools::{Tool, ToolOutcome};
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

/// Tool with a fixed name that always answers the same text
pub struct StubTool {
    name: String,
    reply: String,
}

impl StubTool {
    pub fn new(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl Tool for StubTool {
    async fn invoke(&self, _input: Value) -> ToolOutcome {
        ToolOutcome::text(self.reply.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Stub"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object"})
    }
}
