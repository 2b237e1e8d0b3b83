//! Serper (Google search) client

use super::http_client;
use crate::error::{Result, StockError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://google.serper.dev";

/// Line printed between formatted hits
pub const HIT_SEPARATOR: &str = "-----------------";

/// Which Serper index to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// General web search
    Web,
    /// News search
    News,
}

impl SearchKind {
    fn path(self) -> &'static str {
        match self {
            Self::Web => "search",
            Self::News => "news",
        }
    }

    /// Response field holding the hits
    fn results_field(self) -> &'static str {
        match self {
            Self::Web => "organic",
            Self::News => "news",
        }
    }
}

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

/// Serper API client
#[derive(Debug, Clone)]
pub struct SerperClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerperClient {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Run a query against the web or news index
    pub async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<SearchHit>> {
        let url = format!("{}/{}", self.base_url, kind.path());
        debug!(?kind, query, "Serper search");

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(StockError::RateLimitExceeded {
                provider: "Serper".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::api("Serper", format!("HTTP {status}: {body}")));
        }

        let data: serde_json::Value = response.json().await?;
        parse_hits(kind, &data)
    }
}

/// Extract hits from a Serper response body
pub fn parse_hits(kind: SearchKind, data: &serde_json::Value) -> Result<Vec<SearchHit>> {
    if let Some(message) = data.get("message").and_then(|m| m.as_str()) {
        return Err(StockError::api("Serper", message));
    }
    match data.get(kind.results_field()) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(results) => Ok(serde_json::from_value(results.clone())?),
    }
}

/// Format the first `n` hits; hits missing a field are skipped
pub fn format_hits(hits: &[SearchHit], n: usize) -> String {
    hits.iter()
        .take(n)
        .filter_map(|hit| {
            let (Some(title), Some(link), Some(snippet)) = (&hit.title, &hit.link, &hit.snippet)
            else {
                return None;
            };
            Some(format!(
                "Title: {title}\nLink: {link}\nSnippet: {snippet}\n\n{HIT_SEPARATOR}"
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
