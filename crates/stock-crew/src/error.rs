//! Error types for the stock crew

use thiserror::Error;

/// Stock crew errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Missing or invalid configuration; raised before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Subreddit name Reddit would not accept
    #[error("Invalid subreddit: {0}")]
    InvalidSubreddit(String),

    /// Upstream API returned an error
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    Indicator(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Agent or pipeline failure
    #[error(transparent)]
    Pipeline(#[from] crew_core::Error),

    /// Markdown, HTML or PDF conversion failed
    #[error("Render error: {0}")]
    Render(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StockError {
    /// Upstream API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this is a configuration failure
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Pipeline(crew_core::Error::Configuration(_))
        )
    }
}

/// Result type alias for stock crew operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<StockError> for crew_core::Error {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Pipeline(inner) => inner,
            StockError::Config(msg) => crew_core::Error::Configuration(msg),
            other => crew_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<crew_prompt::PromptError> for StockError {
    fn from(err: crew_prompt::PromptError) -> Self {
        StockError::Pipeline(err.into())
    }
}

impl From<crew_llm::LLMError> for StockError {
    fn from(err: crew_llm::LLMError) -> Self {
        StockError::Pipeline(err.into())
    }
}
