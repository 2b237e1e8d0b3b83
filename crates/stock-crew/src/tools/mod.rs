//! Data-retrieval tools available to the crew's agents

pub mod fundamental;
pub mod search;
pub mod sentiment;
pub mod technical;
pub mod yahoo_news;

pub use fundamental::FundamentalAnalysisTool;
pub use search::SearchTool;
pub use sentiment::SentimentTool;
pub use technical::{TechnicalAnalysisTool, TechnicalSummary};
pub use yahoo_news::YahooNewsTool;

use crate::api::{
    AlphaVantageClient, HuggingFaceClient, RedditClient, SerperClient, YahooFinanceClient,
};
use crate::cache::ToolCache;
use crate::config::CrewConfig;
use crate::error::{Result, StockError};
use crate::sentiment::{HuggingFaceClassifier, RedditPostSource, SentimentScorer};
use crew_tools::{Tool, ToolRegistry};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Alpha Vantage free-tier requests per minute
const ALPHA_VANTAGE_RATE: u32 = 5;

/// What an agent may be allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    WebSearch,
    NewsSearch,
    YahooFinanceNews,
    TechnicalAnalysis,
    FundamentalAnalysis,
    RedditSentiment,
}

impl Capability {
    pub const ALL: [Self; 6] = [
        Self::RedditSentiment,
        Self::WebSearch,
        Self::NewsSearch,
        Self::YahooFinanceNews,
        Self::TechnicalAnalysis,
        Self::FundamentalAnalysis,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WebSearch => "web search",
            Self::NewsSearch => "news search",
            Self::YahooFinanceNews => "Yahoo Finance news",
            Self::TechnicalAnalysis => "technical analysis",
            Self::FundamentalAnalysis => "fundamental analysis",
            Self::RedditSentiment => "Reddit sentiment",
        };
        f.write_str(name)
    }
}

/// One instance of each concrete tool, keyed by capability
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: HashMap<Capability, Arc<dyn Tool>>,
}

impl ToolSet {
    /// Build every tool from configuration; calls go through `cache`
    pub fn from_config(config: &CrewConfig, cache: &ToolCache) -> Self {
        let timeout = config.request_timeout;
        let serper = SerperClient::new(&config.serper_api_key, timeout);
        let yahoo = YahooFinanceClient::new(timeout);
        let alpha_vantage = config
            .alpha_vantage_api_key
            .as_ref()
            .map(|key| AlphaVantageClient::new(key, ALPHA_VANTAGE_RATE, timeout));

        let scorer = SentimentScorer::new(
            Arc::new(RedditPostSource::new(
                RedditClient::new(config.reddit.clone(), timeout)
                    .with_window(config.sentiment_window_days),
            )),
            Arc::new(HuggingFaceClassifier::new(HuggingFaceClient::new(
                &config.huggingface_token,
                timeout,
            ))),
            config.sentiment_window_days,
        );

        let mut set = Self::empty();
        set.insert(
            Capability::WebSearch,
            cache.wrap(Arc::new(SearchTool::internet(serper.clone(), config.search_results))),
        );
        set.insert(
            Capability::NewsSearch,
            cache.wrap(Arc::new(SearchTool::news(serper, config.search_results))),
        );
        set.insert(
            Capability::YahooFinanceNews,
            cache.wrap(Arc::new(YahooNewsTool::new(yahoo.clone(), config.news_results))),
        );
        set.insert(
            Capability::TechnicalAnalysis,
            cache.wrap(Arc::new(TechnicalAnalysisTool::new(yahoo))),
        );
        set.insert(
            Capability::FundamentalAnalysis,
            cache.wrap(Arc::new(FundamentalAnalysisTool::new(alpha_vantage))),
        );
        set.insert(
            Capability::RedditSentiment,
            cache.wrap(Arc::new(SentimentTool::new(
                Arc::new(scorer),
                config.subreddits.clone(),
                config.posts_per_subreddit,
            ))),
        );
        set
    }

    /// A set with no tools
    pub fn empty() -> Self {
        Self::default()
    }

    /// Provide (or replace) the tool behind a capability
    pub fn insert(&mut self, capability: Capability, tool: Arc<dyn Tool>) {
        self.tools.insert(capability, tool);
    }

    /// Registry holding the tools for `capabilities`, in that order
    pub fn resolve(&self, capabilities: &[Capability]) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for capability in capabilities {
            let tool = self.tools.get(capability).ok_or_else(|| {
                StockError::Config(format!("no tool available for capability: {capability}"))
            })?;
            registry.register(Arc::clone(tool))?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedditCredentials;
    use std::time::Duration;

    fn config() -> CrewConfig {
        CrewConfig::builder()
            .serper_api_key("serper")
            .reddit(RedditCredentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
                user_agent: "ua".into(),
            })
            .huggingface_token("hf")
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_keeps_requested_order() {
        let set = ToolSet::from_config(&config(), &ToolCache::new(Duration::from_secs(60)));
        let registry = set
            .resolve(&[
                Capability::RedditSentiment,
                Capability::WebSearch,
                Capability::YahooFinanceNews,
            ])
            .unwrap();
        assert_eq!(
            registry.names(),
            vec!["reddit_sentiment_analysis", "search_internet", "yahoo_finance_news"]
        );

        let all = set.resolve(&Capability::ALL).unwrap();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn test_missing_capability_is_config_error() {
        let err = ToolSet::empty()
            .resolve(&[Capability::TechnicalAnalysis])
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("technical analysis"));
    }

    #[test]
    fn test_duplicate_capability_rejected() {
        let set = ToolSet::from_config(&config(), &ToolCache::new(Duration::from_secs(60)));
        let err = set
            .resolve(&[Capability::WebSearch, Capability::WebSearch])
            .unwrap_err();
        assert!(err.is_config());
    }
}
