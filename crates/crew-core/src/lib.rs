//! Core abstractions for stock-crew
//!
//! This crate defines the fundamental traits and types shared by the LLM,
//! tool and runtime crates: the [`Agent`] trait, the append-only
//! [`TaskContext`] threaded through a pipeline run, [`TokenUsage`] counters
//! and the framework [`Error`].

pub mod agent;
pub mod context;
pub mod error;
pub mod usage;

pub use agent::{Agent, AgentOutput};
pub use context::{TaskContext, TaskOutput};
pub use error::{Error, Result};
pub use usage::TokenUsage;
