//! Reddit sentiment tool

use async_trait::async_trait;
use crew_llm::tools::schema;
use crew_tools::{Tool, ToolFailure, ToolOutcome, params};
use serde_json::Value;
use std::sync::Arc;

use crate::api::validate_subreddit;
use crate::sentiment::SentimentScorer;

/// `reddit_sentiment_analysis`: label counts over recent subreddit posts
pub struct SentimentTool {
    scorer: Arc<SentimentScorer>,
    subreddits: Vec<String>,
    limit: u32,
}

impl SentimentTool {
    pub fn new(scorer: Arc<SentimentScorer>, subreddits: Vec<String>, limit: u32) -> Self {
        Self {
            scorer,
            subreddits,
            limit,
        }
    }
}

#[async_trait]
impl Tool for SentimentTool {
    async fn invoke(&self, input: Value) -> ToolOutcome {
        let ticker = match params::required_str(&input, "ticker") {
            Ok(t) => t.to_uppercase(),
            Err(failure) => return failure.into(),
        };
        let subreddits = match params::optional_str_list(&input, "subreddits") {
            Ok(Some(list)) if !list.is_empty() => {
                match list
                    .iter()
                    .map(|name| validate_subreddit(name).map(str::to_string))
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(names) => names,
                    Err(e) => return ToolFailure::invalid_input(e.to_string()).into(),
                }
            }
            Ok(_) => self.subreddits.clone(),
            Err(failure) => return failure.into(),
        };
        let limit = match params::optional_u64(&input, "limit") {
            Ok(Some(n)) => u32::try_from(n).unwrap_or(u32::MAX).min(self.limit),
            Ok(None) => self.limit,
            Err(failure) => return failure.into(),
        };

        let report = self.scorer.score(&ticker, &subreddits, limit).await;
        let failed: Vec<String> = report
            .failed_sources()
            .map(|s| format!("r/{}: {}", s.source, s.error.as_deref().unwrap_or_default()))
            .collect();
        if !report.per_source.is_empty() && failed.len() == report.per_source.len() {
            return ToolFailure::upstream(failed.join("; ")).into();
        }
        ToolOutcome::counts(report.counts.to_map())
    }

    fn name(&self) -> &str {
        "reddit_sentiment_analysis"
    }

    fn description(&self) -> &str {
        "Count negative, neutral and positive Reddit posts about a stock ticker from the last \
         30 days."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            [
                ("ticker", schema::string("Stock ticker symbol, e.g. AAPL")),
                ("subreddits", schema::strings("Subreddits to scan (optional)")),
                (
                    "limit",
                    schema::integer("Posts per subreddit (optional, at most the configured limit)"),
                ),
            ],
            &["ticker"],
        )
    }
}
