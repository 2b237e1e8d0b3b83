//! Error types for prompt operations

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur during prompt operations
#[derive(Error, Debug)]
pub enum PromptError {
    /// Template source failed to parse
    #[error("Failed to parse template '{name}': {detail}")]
    TemplateParseFailed { name: String, detail: String },

    /// Template references a placeholder that was not declared
    #[error("Template '{name}' uses undeclared placeholder(s): {placeholders}")]
    UndeclaredPlaceholder { name: String, placeholders: String },

    /// Template rendering failed
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// A declared placeholder was not supplied at render time
    #[error("Template '{name}' is missing value for placeholder '{placeholder}'")]
    MissingValue { name: String, placeholder: String },
}

impl From<PromptError> for crew_core::Error {
    fn from(err: PromptError) -> Self {
        crew_core::Error::Template(err.to_string())
    }
}
