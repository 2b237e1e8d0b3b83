//! Internet and news search tools

use async_trait::async_trait;
use crew_llm::tools::schema;
use crew_tools::{Tool, ToolFailure, ToolOutcome, params};
use serde_json::Value;
use tracing::debug;

use crate::api::{SearchKind, SerperClient, format_hits};

/// Serper-backed search over the web or news index
pub struct SearchTool {
    client: SerperClient,
    kind: SearchKind,
    results: usize,
}

impl SearchTool {
    /// `search_internet`
    pub fn internet(client: SerperClient, results: usize) -> Self {
        Self {
            client,
            kind: SearchKind::Web,
            results,
        }
    }

    /// `search_news`
    pub fn news(client: SerperClient, results: usize) -> Self {
        Self {
            client,
            kind: SearchKind::News,
            results,
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    async fn invoke(&self, input: Value) -> ToolOutcome {
        let query = match params::required_str(&input, "query") {
            Ok(q) => q,
            Err(failure) => return failure.into(),
        };

        match self.client.search(self.kind, query).await {
            Ok(hits) => {
                debug!(query, hits = hits.len(), "Search returned");
                ToolOutcome::text(format_hits(&hits, self.results))
            }
            Err(e) => ToolFailure::upstream(e.to_string()).into(),
        }
    }

    fn name(&self) -> &str {
        match self.kind {
            SearchKind::Web => "search_internet",
            SearchKind::News => "search_news",
        }
    }

    fn description(&self) -> &str {
        match self.kind {
            SearchKind::Web => {
                "Search the internet about a given topic and return relevant results \
                 (title, link and snippet)."
            }
            SearchKind::News => {
                "Search news about a company, stock or any other topic and return relevant \
                 results (title, link and snippet)."
            }
        }
    }

    fn input_schema(&self) -> Value {
        schema::object([("query", schema::string("Search query"))], &["query"])
    }
}
