//! Tool outcome types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Text rendered for a successful call that found nothing
pub const NO_RESULTS: &str = "No results found.";

/// Result of a single tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The call succeeded (possibly with an empty result)
    Success(ToolPayload),
    /// The call failed; the failure is reported to the model, not raised
    Failed(ToolFailure),
}

/// Successful tool payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPayload {
    /// Formatted text block (search and news tools)
    Text(String),
    /// Structured mapping (technical and fundamental tools)
    Structured(serde_json::Value),
    /// Label counts (sentiment tool)
    Counts(BTreeMap<String, u64>),
}

/// Category of tool failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The model supplied unusable arguments
    InvalidInput,
    /// The external service failed or returned something unusable
    Upstream,
    /// The tool lacks a credential it needs
    NotConfigured,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidInput => "invalid input",
            Self::Upstream => "upstream error",
            Self::NotConfigured => "not configured",
        })
    }
}

/// Structured failure reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable detail
    pub message: String,
}

impl ToolFailure {
    /// Create a failure
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Invalid-input failure
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidInput, message)
    }

    /// Upstream failure
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Upstream, message)
    }

    /// Missing-credential failure
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotConfigured, message)
    }
}

impl From<ToolFailure> for ToolOutcome {
    fn from(failure: ToolFailure) -> Self {
        Self::Failed(failure)
    }
}

impl ToolOutcome {
    /// Text success
    pub fn text(text: impl Into<String>) -> Self {
        Self::Success(ToolPayload::Text(text.into()))
    }

    /// Structured success
    pub fn structured(value: serde_json::Value) -> Self {
        Self::Success(ToolPayload::Structured(value))
    }

    /// Counts success
    pub fn counts(counts: BTreeMap<String, u64>) -> Self {
        Self::Success(ToolPayload::Counts(counts))
    }

    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Text fed back to the model for this outcome
    pub fn render(&self, tool_name: &str) -> String {
        match self {
            Self::Success(ToolPayload::Text(text)) if text.trim().is_empty() => {
                NO_RESULTS.to_string()
            }
            Self::Success(ToolPayload::Text(text)) => text.clone(),
            Self::Success(ToolPayload::Structured(value)) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Success(ToolPayload::Counts(counts)) => {
                let parts: Vec<String> = counts.iter().map(|(k, v)| format!("'{k}': {v}")).collect();
                format!("{{{}}}", parts.join(", "))
            }
            Self::Failed(failure) => format!(
                "Tool '{tool_name}' failed ({}): {}",
                failure.kind, failure.message
            ),
        }
    }
}
