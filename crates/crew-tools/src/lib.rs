//! Tool framework for stock-crew
//!
//! Tools are the data-retrieval functions agents may call. A tool never
//! returns `Err`: every outcome, including an upstream failure, is a
//! [`ToolOutcome`] that is rendered back to the model as text, so one failed
//! external call degrades a step's context instead of aborting the run.

pub mod outcome;
pub mod registry;
pub mod tool;

pub use outcome::{FailureKind, ToolFailure, ToolOutcome, ToolPayload};
pub use registry::ToolRegistry;
pub use tool::{Tool, params};
