//! Prompt templates for stock-crew
//!
//! Two ways to produce prompt text:
//!
//! - [`TaskTemplate`]: a named Jinja template whose placeholders are declared
//!   up front and checked when the template is built, so a typo in a
//!   placeholder fails at startup rather than halfway through a run.
//! - [`PromptBuilder`]: a fluent builder for prompts assembled in code.
//!
//! # Example
//!
//! ```
//! use crew_prompt::TaskTemplate;
//! use serde_json::json;
//!
//! let template = TaskTemplate::new(
//!     "research",
//!     "Gather data about {{ stock_symbol }}.",
//!     &["stock_symbol"],
//! )?;
//! assert_eq!(
//!     template.render(&json!({ "stock_symbol": "AAPL" }))?,
//!     "Gather data about AAPL."
//! );
//! # Ok::<(), crew_prompt::PromptError>(())
//! ```

pub mod builder;
pub mod error;
pub mod template;

pub use builder::PromptBuilder;
pub use error::{PromptError, Result};
pub use template::TaskTemplate;
