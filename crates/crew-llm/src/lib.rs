//! LLM provider abstraction layer for stock-crew
//!
//! This crate provides provider-agnostic abstractions for talking to hosted
//! language models. It includes:
//!
//! - Message types for LLM communication (text, tool calls, tool results)
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The [`LLMProvider`] trait
//! - [`ModelChoice`], the fixed menu of model backends a run may select
//! - An OpenAI-compatible provider that serves both OpenAI and Groq

pub mod backend;
pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod tools;

// Re-export main types
pub use backend::{BackendSpec, ModelChoice, ProviderKind};
pub use completion::{CompletionRequest, CompletionRequestBuilder, CompletionResponse, StopReason};
pub use crew_core::TokenUsage;
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role, ToolCall};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;
