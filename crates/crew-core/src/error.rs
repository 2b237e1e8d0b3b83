//! Error types for crew-core

use thiserror::Error;

/// Result type alias for crew-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent and pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing configuration; raised before any external call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// Language-model backend failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt template failure
    #[error("Template error: {0}")]
    Template(String),

    /// I/O failure while writing run artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
