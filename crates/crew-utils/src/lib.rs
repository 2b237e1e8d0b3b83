//! Shared utilities for stock-crew
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and a small abstraction over where configuration values
//! come from, so that library code never reads the process environment
//! directly.

pub mod env;
pub mod logging;

pub use env::{EnvSource, ProcessEnv, load_dotenv, mask_secret};
pub use logging::{init_tracing, init_tracing_with};
