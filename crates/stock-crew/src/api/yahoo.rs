//! Yahoo Finance client

use super::http_client;
use crate::error::{Result, StockError};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/// Daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A headline from the Yahoo Finance news search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

/// Yahoo Finance client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a new client
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
        }
    }

    /// Daily candles for the trailing `days`
    pub async fn daily_history(&self, symbol: &str, days: i64) -> Result<Vec<Candle>> {
        let end = Utc::now();
        let start = end - ChronoDuration::days(days);

        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::api("Yahoo Finance", e.to_string()))?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::api("Yahoo Finance", format!("invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::api("Yahoo Finance", format!("invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let quotes = response.quotes().map_err(|e| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;
        debug!(symbol, bars = quotes.len(), "Fetched price history");

        Ok(quotes
            .iter()
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0).map(|timestamp| Candle {
                    timestamp,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect())
    }

    /// Latest headlines mentioning `symbol`
    pub async fn news(&self, symbol: &str, count: usize) -> Result<Vec<NewsItem>> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", symbol.to_string()),
                ("quotesCount", "0".to_string()),
                ("newsCount", count.to_string()),
            ])
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StockError::api("Yahoo Finance", format!("news search failed: HTTP {status}")));
        }

        let body: serde_json::Value = response.json().await?;
        let mut items = parse_news(body)?;
        items.truncate(count);
        Ok(items)
    }
}

pub(crate) fn parse_news(body: serde_json::Value) -> Result<Vec<NewsItem>> {
    let parsed: SearchResponse = serde_json::from_value(body)?;
    Ok(parsed.news)
}

/// One line per headline: `- title (publisher) <link>`
pub fn format_news(items: &[NewsItem]) -> String {
    items
        .iter()
        .map(|item| {
            let mut line = format!("- {}", item.title);
            if let Some(publisher) = &item.publisher {
                line.push_str(&format!(" ({publisher})"));
            }
            if let Some(link) = &item.link {
                line.push_str(&format!(" <{link}>"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
