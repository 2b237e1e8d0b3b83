//! Yahoo Finance headlines

use async_trait::async_trait;
use crew_llm::tools::schema;
use crew_tools::{Tool, ToolFailure, ToolOutcome, params};
use serde_json::Value;

use crate::api::{YahooFinanceClient, format_news};

/// `yahoo_finance_news`: latest headlines for a ticker
pub struct YahooNewsTool {
    client: YahooFinanceClient,
    count: usize,
}

impl YahooNewsTool {
    pub fn new(client: YahooFinanceClient, count: usize) -> Self {
        Self { client, count }
    }
}

#[async_trait]
impl Tool for YahooNewsTool {
    async fn invoke(&self, input: Value) -> ToolOutcome {
        let ticker = match params::required_str(&input, "ticker") {
            Ok(t) => t.to_uppercase(),
            Err(failure) => return failure.into(),
        };

        match self.client.news(&ticker, self.count).await {
            Ok(items) => ToolOutcome::text(format_news(&items)),
            Err(e) => ToolFailure::upstream(e.to_string()).into(),
        }
    }

    fn name(&self) -> &str {
        "yahoo_finance_news"
    }

    fn description(&self) -> &str {
        "Latest Yahoo Finance news headlines for a stock ticker, with publisher and link."
    }

    fn input_schema(&self) -> Value {
        schema::ticker()
    }
}
