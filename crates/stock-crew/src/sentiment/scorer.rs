//! Aggregate social sentiment for a symbol

use super::{PostSource, SentimentClassifier, SentimentCounts};
use chrono::{Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of scanning one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: String,
    /// Posts inside the window that were handed to the classifier
    pub fetched: usize,
    /// Set when the fetch failed; nothing from this source was counted
    pub error: Option<String>,
}

/// Tallies across all sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub counts: SentimentCounts,
    pub per_source: Vec<SourceStatus>,
    /// Posts whose classification failed
    pub skipped: u64,
}

impl SentimentReport {
    /// Sources whose fetch failed
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceStatus> {
        self.per_source.iter().filter(|s| s.error.is_some())
    }
}

/// Fetches posts per source and classifies each title
pub struct SentimentScorer {
    source: Arc<dyn PostSource>,
    classifier: Arc<dyn SentimentClassifier>,
    window: Duration,
}

impl SentimentScorer {
    pub fn new(
        source: Arc<dyn PostSource>,
        classifier: Arc<dyn SentimentClassifier>,
        window_days: u32,
    ) -> Self {
        Self {
            source,
            classifier,
            window: Duration::days(i64::from(window_days)),
        }
    }

    /// Score `symbol` over `sources`, at most `limit` posts per source
    ///
    /// Sources are fetched concurrently and reported in the given order. A
    /// failing source is recorded and the rest still count.
    #[instrument(skip(self, sources))]
    pub async fn score(&self, symbol: &str, sources: &[String], limit: u32) -> SentimentReport {
        let mut report = SentimentReport::default();
        if limit == 0 || sources.is_empty() {
            return report;
        }

        let scans = sources.iter().map(|source| self.scan(source, symbol, limit));
        for (status, counts, skipped) in join_all(scans).await {
            report.counts.merge(&counts);
            report.skipped += skipped;
            report.per_source.push(status);
        }

        info!(
            negative = report.counts.negative,
            neutral = report.counts.neutral,
            positive = report.counts.positive,
            skipped = report.skipped,
            "Sentiment scored"
        );
        report
    }

    async fn scan(&self, source: &str, symbol: &str, limit: u32) -> (SourceStatus, SentimentCounts, u64) {
        let mut counts = SentimentCounts::default();
        let mut skipped = 0;

        let posts = match self.source.recent_posts(source, symbol, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!(source, error = %e, "Post fetch failed");
                let status = SourceStatus {
                    source: source.to_string(),
                    fetched: 0,
                    error: Some(e.to_string()),
                };
                return (status, counts, 0);
            }
        };

        let cutoff = Utc::now() - self.window;
        let recent: Vec<_> = posts
            .into_iter()
            .filter(|p| p.created >= cutoff)
            .take(limit as usize)
            .collect();
        debug!(source, posts = recent.len(), "Classifying posts");

        for post in &recent {
            match self.classifier.classify(&post.title).await {
                Ok(label) => counts.record(label),
                Err(e) => {
                    debug!(source, error = %e, "Skipping unclassifiable post");
                    skipped += 1;
                }
            }
        }

        let status = SourceStatus {
            source: source.to_string(),
            fetched: recent.len(),
            error: None,
        };
        (status, counts, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;
    use crate::sentiment::{MockPostSource, MockSentimentClassifier, Post, SentimentLabel};

    fn post(title: &str, days_ago: i64) -> Post {
        Post {
            title: title.to_string(),
            created: Utc::now() - Duration::days(days_ago),
        }
    }

    fn label_by_title() -> MockSentimentClassifier {
        let mut classifier = MockSentimentClassifier::new();
        classifier.expect_classify().returning(|text| {
            if text.contains("moon") {
                Ok(SentimentLabel::Positive)
            } else if text.contains("crash") {
                Ok(SentimentLabel::Negative)
            } else if text.contains("garbled") {
                Err(StockError::api("Hugging Face", "bad input"))
            } else {
                Ok(SentimentLabel::Neutral)
            }
        });
        classifier
    }

    fn sources(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_counts_sum_to_classified_posts() {
        let mut source = MockPostSource::new();
        source.expect_recent_posts().returning(|source, _, _| {
            if source == "stocks" {
                Ok(vec![post("ACME to the moon", 1), post("ACME earnings", 2)])
            } else {
                Ok(vec![post("ACME crash incoming", 3), post("garbled", 1)])
            }
        });

        let scorer = SentimentScorer::new(Arc::new(source), Arc::new(label_by_title()), 30);
        let report = scorer
            .score("ACME", &sources(&["stocks", "investing"]), 100)
            .await;

        assert_eq!(report.counts.positive, 1);
        assert_eq!(report.counts.neutral, 1);
        assert_eq!(report.counts.negative, 1);
        assert_eq!(report.skipped, 1);
        let fetched: usize = report.per_source.iter().map(|s| s.fetched).sum();
        assert_eq!(report.counts.total() + report.skipped, fetched as u64);
    }

    #[tokio::test]
    async fn test_window_filters_old_posts() {
        let mut source = MockPostSource::new();
        source
            .expect_recent_posts()
            .returning(|_, _, _| Ok(vec![post("ACME to the moon", 5), post("ACME to the moon", 45)]));

        let scorer = SentimentScorer::new(Arc::new(source), Arc::new(label_by_title()), 30);
        let report = scorer.score("ACME", &sources(&["stocks"]), 100).await;
        assert_eq!(report.counts.positive, 1);
        assert_eq!(report.per_source[0].fetched, 1);
    }

    #[tokio::test]
    async fn test_failing_source_does_not_abort() {
        let mut source = MockPostSource::new();
        source.expect_recent_posts().returning(|source, _, _| {
            if source == "wallstreetbets" {
                Err(StockError::api("Reddit", "HTTP 503"))
            } else {
                Ok(vec![post("ACME to the moon", 1)])
            }
        });

        let scorer = SentimentScorer::new(Arc::new(source), Arc::new(label_by_title()), 30);
        let report = scorer
            .score("ACME", &sources(&["wallstreetbets", "stocks"]), 10)
            .await;

        assert_eq!(report.counts.total(), 1);
        assert_eq!(report.per_source[0].source, "wallstreetbets");
        assert!(report.per_source[0].error.as_deref().unwrap().contains("503"));
        assert_eq!(report.per_source[1].source, "stocks");
        assert_eq!(report.failed_sources().count(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_calls() {
        let mut source = MockPostSource::new();
        source.expect_recent_posts().never();
        let mut classifier = MockSentimentClassifier::new();
        classifier.expect_classify().never();

        let scorer = SentimentScorer::new(Arc::new(source), Arc::new(classifier), 30);
        let report = scorer.score("ACME", &sources(&["stocks"]), 0).await;

        assert_eq!(report.counts, SentimentCounts::default());
        assert!(report.per_source.is_empty());
    }

    #[tokio::test]
    async fn test_limit_caps_posts_per_source() {
        let mut source = MockPostSource::new();
        source
            .expect_recent_posts()
            .withf(|_, symbol, limit| symbol == "ACME" && *limit == 2)
            .returning(|_, _, _| {
                Ok(vec![post("a", 1), post("b", 1), post("c", 1)])
            });

        let scorer = SentimentScorer::new(Arc::new(source), Arc::new(label_by_title()), 30);
        let report = scorer.score("ACME", &sources(&["stocks"]), 2).await;
        assert_eq!(report.counts.neutral, 2);
    }
}
