//! Agent runtime for stock-crew
//!
//! - [`AgentExecutor`]: the LLM ↔ tool loop for one prompt
//! - [`CrewAgent`]: a role (goal, backstory, tools) bound to a model backend
//! - [`Task`]: a description template and expected output owned by an agent
//! - [`Pipeline`]: runs tasks strictly in order, threading each output into
//!   the next task's context
//! - [`RunObserver`]: hooks for tracing a run step by step

pub mod agent;
pub mod executor;
pub mod observer;
pub mod pipeline;
pub mod task;

pub use agent::{CrewAgent, CrewAgentBuilder};
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use observer::{NoOpObserver, RunObserver};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use task::Task;

#[cfg(test)]
pub(crate) mod testing;
