//! Model backend selection
//!
//! A run picks exactly one [`ModelChoice`]; every agent in the run shares the
//! resulting [`BackendSpec`].

use crate::LLMError;
use std::fmt;
use std::str::FromStr;

/// Sampling temperature shared by every backend
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Hosted service that serves a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAI,
    /// Groq, reached through its OpenAI-compatible endpoint
    Groq,
}

impl ProviderKind {
    /// Default chat-completions base URL
    pub fn default_api_base(self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }

    /// Environment variable that overrides the base URL
    pub fn api_base_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_BASE",
            Self::Groq => "GROQ_API_BASE",
        }
    }

    /// Short provider name
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Groq => "groq",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete backend a run talks to
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSpec {
    /// Serving provider
    pub provider: ProviderKind,
    /// Provider-side model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
}

/// The supported model options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelChoice {
    /// OpenAI GPT-4o Mini
    Gpt4oMini,
    /// Llama 3 8B on Groq
    Llama3_8b,
    /// Llama 3.1 70B on Groq
    Llama31_70b,
    /// Llama 3.1 8B on Groq
    Llama31_8b,
}

impl ModelChoice {
    /// Every choice, in menu order
    pub fn all() -> [Self; 4] {
        [
            Self::Gpt4oMini,
            Self::Llama3_8b,
            Self::Llama31_70b,
            Self::Llama31_8b,
        ]
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Gpt4oMini => "OpenAI GPT-4o Mini",
            Self::Llama3_8b => "Llama 3 8B",
            Self::Llama31_70b => "Llama 3.1 70B",
            Self::Llama31_8b => "Llama 3.1 8B",
        }
    }

    /// Short command-line id
    pub fn id(self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Llama3_8b => "llama3-8b",
            Self::Llama31_70b => "llama3.1-70b",
            Self::Llama31_8b => "llama3.1-8b",
        }
    }

    /// Serving provider
    pub fn provider(self) -> ProviderKind {
        match self {
            Self::Gpt4oMini => ProviderKind::OpenAI,
            Self::Llama3_8b | Self::Llama31_70b | Self::Llama31_8b => ProviderKind::Groq,
        }
    }

    /// Provider-side model identifier
    pub fn model(self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Llama3_8b => "llama3-8b-8192",
            Self::Llama31_70b => "llama-3.1-70b-versatile",
            Self::Llama31_8b => "llama-3.1-8b-instant",
        }
    }

    /// Resolve to a backend spec
    pub fn spec(self) -> BackendSpec {
        BackendSpec {
            provider: self.provider(),
            model: self.model().to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelChoice {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted) || c.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let labels: Vec<&str> = Self::all().iter().map(|c| c.label()).collect();
                LLMError::ConfigurationError(format!(
                    "unknown model '{wanted}', expected one of: {}",
                    labels.join(", ")
                ))
            })
    }
}
