//! Run configuration
//!
//! Everything a run needs from the environment is read once, validated and
//! handed to [`crate::run`] as plain values. Missing required keys are all
//! reported together in one configuration error.

use crate::api::validate_subreddit;
use crate::error::{Result, StockError};
use crew_llm::providers::{OpenAIConfig, OpenAIProvider};
use crew_llm::{LLMProvider, ProviderKind};
use crew_utils::{EnvSource, mask_secret};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default directory for report artifacts
pub const DEFAULT_RESULTS_DIR: &str = "./crew_results";

/// Default external HTML → PDF command
pub const DEFAULT_PDF_COMMAND: &str = "weasyprint {html} {pdf}";

/// Environment keys a run cannot start without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredKey {
    /// Serper web/news search
    SerperApiKey,
    /// Reddit script-app client id
    RedditClientId,
    /// Reddit script-app client secret
    RedditClientSecret,
    /// Reddit user agent string
    RedditUserAgent,
    /// Hugging Face inference token for the sentiment model
    HuggingFaceToken,
}

impl RequiredKey {
    /// Every required key
    pub const ALL: [Self; 5] = [
        Self::SerperApiKey,
        Self::RedditClientId,
        Self::RedditClientSecret,
        Self::RedditUserAgent,
        Self::HuggingFaceToken,
    ];

    /// Environment variable name
    pub fn var(self) -> &'static str {
        match self {
            Self::SerperApiKey => "SERPER_API_KEY",
            Self::RedditClientId => "REDDIT_CLIENT_ID",
            Self::RedditClientSecret => "REDDIT_CLIENT_SECRET",
            Self::RedditUserAgent => "REDDIT_USER_AGENT",
            Self::HuggingFaceToken => "HUGGINGFACE_API_TOKEN",
        }
    }
}

/// Reddit script-app credentials
#[derive(Clone, PartialEq, Eq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &mask_secret(&self.client_id))
            .field("client_secret", &mask_secret(&self.client_secret))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Validated configuration for one run
#[derive(Clone)]
pub struct CrewConfig {
    /// Serper API key
    pub serper_api_key: String,
    /// Reddit credentials
    pub reddit: RedditCredentials,
    /// Hugging Face inference token
    pub huggingface_token: String,
    /// Alpha Vantage key; the fundamental tool reports "not configured" without it
    pub alpha_vantage_api_key: Option<String>,
    /// Where report artifacts are written
    pub results_dir: PathBuf,
    /// Subreddits scanned for sentiment
    pub subreddits: Vec<String>,
    /// Posts fetched per subreddit
    pub posts_per_subreddit: u32,
    /// Sentiment look-back window
    pub sentiment_window_days: u32,
    /// Search hits kept per query
    pub search_results: usize,
    /// Yahoo headlines kept per query
    pub news_results: usize,
    /// HTTP timeout for data APIs
    pub request_timeout: Duration,
    /// Executor tool rounds per task
    pub max_iterations: usize,
    /// Max tokens per completion
    pub max_tokens: usize,
    /// Lifetime of cached tool results
    pub tool_cache_ttl: Duration,
    /// HTML → PDF command template
    pub pdf_command: String,
}

impl std::fmt::Debug for CrewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrewConfig")
            .field("serper_api_key", &mask_secret(&self.serper_api_key))
            .field("reddit", &self.reddit)
            .field("huggingface_token", &mask_secret(&self.huggingface_token))
            .field("alpha_vantage", &self.alpha_vantage_api_key.is_some())
            .field("results_dir", &self.results_dir)
            .field("subreddits", &self.subreddits)
            .field("posts_per_subreddit", &self.posts_per_subreddit)
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

impl CrewConfig {
    /// Create a new configuration builder
    pub fn builder() -> CrewConfigBuilder {
        CrewConfigBuilder::default()
    }

    /// Read configuration from an environment source
    pub fn from_env(env: &impl EnvSource) -> Result<Self> {
        let missing: Vec<&str> = RequiredKey::ALL
            .iter()
            .filter(|k| env.var(k.var()).is_none())
            .map(|k| k.var())
            .collect();
        if !missing.is_empty() {
            return Err(StockError::Config(format!(
                "missing required environment variable(s): {}",
                missing.join(", ")
            )));
        }

        let required = |key: RequiredKey| env.var(key.var()).unwrap_or_default();
        debug!(
            serper = %mask_secret(&required(RequiredKey::SerperApiKey)),
            reddit_client = %mask_secret(&required(RequiredKey::RedditClientId)),
            "Loaded credentials"
        );

        let mut builder = Self::builder()
            .serper_api_key(required(RequiredKey::SerperApiKey))
            .reddit(RedditCredentials {
                client_id: required(RequiredKey::RedditClientId),
                client_secret: required(RequiredKey::RedditClientSecret),
                user_agent: required(RequiredKey::RedditUserAgent),
            })
            .huggingface_token(required(RequiredKey::HuggingFaceToken));

        if let Some(key) = env.var("ALPHA_VANTAGE_API_KEY") {
            builder = builder.alpha_vantage_api_key(key);
        }
        if let Some(dir) = env.var("STOCK_CREW_RESULTS_DIR") {
            builder = builder.results_dir(dir);
        }
        if let Some(command) = env.var("STOCK_CREW_PDF_COMMAND") {
            builder = builder.pdf_command(command);
        }

        builder.build()
    }
}

/// Builder for CrewConfig
#[derive(Debug, Default)]
pub struct CrewConfigBuilder {
    serper_api_key: Option<String>,
    reddit: Option<RedditCredentials>,
    huggingface_token: Option<String>,
    alpha_vantage_api_key: Option<String>,
    results_dir: Option<PathBuf>,
    subreddits: Option<Vec<String>>,
    posts_per_subreddit: Option<u32>,
    sentiment_window_days: Option<u32>,
    search_results: Option<usize>,
    news_results: Option<usize>,
    request_timeout: Option<Duration>,
    max_iterations: Option<usize>,
    max_tokens: Option<usize>,
    tool_cache_ttl: Option<Duration>,
    pdf_command: Option<String>,
}

impl CrewConfigBuilder {
    /// Set the Serper API key
    pub fn serper_api_key(mut self, key: impl Into<String>) -> Self {
        self.serper_api_key = Some(key.into());
        self
    }

    /// Set the Reddit credentials
    pub fn reddit(mut self, reddit: RedditCredentials) -> Self {
        self.reddit = Some(reddit);
        self
    }

    /// Set the Hugging Face token
    pub fn huggingface_token(mut self, token: impl Into<String>) -> Self {
        self.huggingface_token = Some(token.into());
        self
    }

    /// Set the Alpha Vantage key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the results directory
    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    /// Set the subreddits scanned for sentiment
    pub fn subreddits<I, S>(mut self, subreddits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subreddits = Some(subreddits.into_iter().map(Into::into).collect());
        self
    }

    /// Set posts fetched per subreddit
    pub fn posts_per_subreddit(mut self, limit: u32) -> Self {
        self.posts_per_subreddit = Some(limit);
        self
    }

    /// Set the sentiment look-back window
    pub fn sentiment_window_days(mut self, days: u32) -> Self {
        self.sentiment_window_days = Some(days);
        self
    }

    /// Set search hits kept per query
    pub fn search_results(mut self, count: usize) -> Self {
        self.search_results = Some(count);
        self
    }

    /// Set Yahoo headlines kept per query
    pub fn news_results(mut self, count: usize) -> Self {
        self.news_results = Some(count);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set executor tool rounds per task
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the tool result cache lifetime
    pub fn tool_cache_ttl(mut self, ttl: Duration) -> Self {
        self.tool_cache_ttl = Some(ttl);
        self
    }

    /// Set the HTML → PDF command template
    pub fn pdf_command(mut self, command: impl Into<String>) -> Self {
        self.pdf_command = Some(command.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CrewConfig> {
        let mut missing = Vec::new();
        let serper_api_key = non_empty(self.serper_api_key);
        if serper_api_key.is_none() {
            missing.push(RequiredKey::SerperApiKey.var());
        }
        let reddit = self.reddit.unwrap_or(RedditCredentials {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: String::new(),
        });
        for (value, key) in [
            (&reddit.client_id, RequiredKey::RedditClientId),
            (&reddit.client_secret, RequiredKey::RedditClientSecret),
            (&reddit.user_agent, RequiredKey::RedditUserAgent),
        ] {
            if value.trim().is_empty() {
                missing.push(key.var());
            }
        }
        let huggingface_token = non_empty(self.huggingface_token);
        if huggingface_token.is_none() {
            missing.push(RequiredKey::HuggingFaceToken.var());
        }
        if !missing.is_empty() {
            return Err(StockError::Config(format!(
                "missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        let config = CrewConfig {
            serper_api_key: serper_api_key.unwrap_or_default(),
            reddit,
            huggingface_token: huggingface_token.unwrap_or_default(),
            alpha_vantage_api_key: non_empty(self.alpha_vantage_api_key),
            results_dir: self
                .results_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR)),
            subreddits: self.subreddits.unwrap_or_else(|| {
                ["wallstreetbets", "stocks", "investing"]
                    .map(String::from)
                    .to_vec()
            }),
            posts_per_subreddit: self.posts_per_subreddit.unwrap_or(100),
            sentiment_window_days: self.sentiment_window_days.unwrap_or(30),
            search_results: self.search_results.unwrap_or(4),
            news_results: self.news_results.unwrap_or(10),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
            max_iterations: self.max_iterations.unwrap_or(15),
            max_tokens: self.max_tokens.unwrap_or(4096),
            tool_cache_ttl: self.tool_cache_ttl.unwrap_or(Duration::from_secs(3600)),
            pdf_command: self
                .pdf_command
                .unwrap_or_else(|| DEFAULT_PDF_COMMAND.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

impl CrewConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.subreddits.iter().find(|s| validate_subreddit(s).is_err()) {
            return Err(StockError::Config(format!("invalid subreddit name '{bad}'")));
        }
        if self.sentiment_window_days == 0 {
            return Err(StockError::Config(
                "sentiment_window_days must be greater than 0".to_string(),
            ));
        }
        if self.search_results == 0 {
            return Err(StockError::Config("search_results must be greater than 0".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(StockError::Config("max_iterations must be greater than 0".to_string()));
        }
        if !self.pdf_command.contains("{html}") || !self.pdf_command.contains("{pdf}") {
            return Err(StockError::Config(
                "pdf command must contain {html} and {pdf} placeholders".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Model-provider keys
///
/// Only the key of the provider behind the selected model is required, and
/// it is checked after the model choice has been parsed.
#[derive(Clone, Default)]
pub struct Credentials {
    openai_api_key: Option<String>,
    groq_api_key: Option<String>,
    openai_api_base: Option<String>,
    groq_api_base: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai", &self.openai_api_key.as_deref().map(mask_secret))
            .field("groq", &self.groq_api_key.as_deref().map(mask_secret))
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Read provider keys and base-URL overrides
    pub fn from_env(env: &impl EnvSource) -> Self {
        Self {
            openai_api_key: env.var(ProviderKind::OpenAI.api_key_var()),
            groq_api_key: env.var(ProviderKind::Groq.api_key_var()),
            openai_api_base: env.var(ProviderKind::OpenAI.api_base_var()),
            groq_api_base: env.var(ProviderKind::Groq.api_base_var()),
        }
    }

    /// Set the OpenAI key
    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = non_empty(Some(key.into()));
        self
    }

    /// Set the Groq key
    pub fn with_groq_key(mut self, key: impl Into<String>) -> Self {
        self.groq_api_key = non_empty(Some(key.into()));
        self
    }

    /// Override a provider's base URL
    pub fn with_api_base(mut self, provider: ProviderKind, base: impl Into<String>) -> Self {
        let base = Some(base.into());
        match provider {
            ProviderKind::OpenAI => self.openai_api_base = base,
            ProviderKind::Groq => self.groq_api_base = base,
        }
        self
    }

    /// Provider config for the given service; fails when its key is absent
    pub fn provider_config(&self, provider: ProviderKind) -> Result<OpenAIConfig> {
        let (key, base) = match provider {
            ProviderKind::OpenAI => (&self.openai_api_key, &self.openai_api_base),
            ProviderKind::Groq => (&self.groq_api_key, &self.groq_api_base),
        };
        let key = key.as_ref().ok_or_else(|| {
            StockError::Config(format!(
                "{} is required for the selected model",
                provider.api_key_var()
            ))
        })?;

        let mut config = OpenAIConfig::for_provider(provider, key.clone());
        if let Some(base) = base {
            config = config.with_api_base(base.clone());
        }
        Ok(config)
    }

    /// Build the language-model provider for the given service
    pub fn provider(&self, provider: ProviderKind) -> Result<Arc<dyn LLMProvider>> {
        let config = self.provider_config(provider)?;
        Ok(Arc::new(OpenAIProvider::with_config(config)?))
    }
}
