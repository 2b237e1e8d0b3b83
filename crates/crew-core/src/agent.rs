//! Core Agent trait definition

use crate::{Result, TokenUsage};
use async_trait::async_trait;

/// What an agent produced for one prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentOutput {
    /// Final answer text
    pub text: String,

    /// Tokens consumed while producing it, across every model round
    pub usage: TokenUsage,
}

impl AgentOutput {
    /// Create an output
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Core trait that all agents must implement
///
/// An agent is a role bound to a language-model backend and a tool set.
/// The prompt handed to [`Agent::perform`] already carries the task
/// description and any upstream context; the agent only has to answer it.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer a fully rendered task prompt
    async fn perform(&self, prompt: String) -> Result<AgentOutput>;

    /// The agent's role name (e.g. "Expert Technical Analyst")
    fn role(&self) -> &str;
}
