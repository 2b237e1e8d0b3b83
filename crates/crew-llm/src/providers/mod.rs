//! Concrete LLM provider implementations
//!
//! OpenAI and Groq share one chat-completions wire format, so a single
//! provider serves both.

pub mod openai;

pub use openai::{OpenAIConfig, OpenAIProvider};
