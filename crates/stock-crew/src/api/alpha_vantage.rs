//! Alpha Vantage API client

use super::{SharedRateLimiter, http_client, rate_limiter};
use crate::error::{Result, StockError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Free-tier request budget
const FREE_TIER_RATE: NonZeroU32 = NonZeroU32::MIN.saturating_add(4);

/// Company overview (`function=OVERVIEW`)
///
/// Every numeric field arrives as a string and may be `"None"` or `"-"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "ForwardPE")]
    pub forward_pe: Option<String>,
    #[serde(rename = "PEGRatio")]
    pub peg_ratio: Option<String>,
    pub price_to_book_ratio: Option<String>,
    #[serde(rename = "PriceToSalesRatioTTM")]
    pub price_to_sales: Option<String>,
    #[serde(rename = "EVToEBITDA")]
    pub ev_to_ebitda: Option<String>,
    #[serde(rename = "EVToRevenue")]
    pub ev_to_revenue: Option<String>,
    pub profit_margin: Option<String>,
    #[serde(rename = "OperatingMarginTTM")]
    pub operating_margin: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity: Option<String>,
    #[serde(rename = "ReturnOnAssetsTTM")]
    pub return_on_assets: Option<String>,
    #[serde(rename = "QuarterlyRevenueGrowthYOY")]
    pub quarterly_revenue_growth: Option<String>,
    #[serde(rename = "QuarterlyEarningsGrowthYOY")]
    pub quarterly_earnings_growth: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    pub beta: Option<String>,
    pub dividend_yield: Option<String>,
    #[serde(rename = "52WeekHigh")]
    pub week_52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    pub week_52_low: Option<String>,
    pub analyst_target_price: Option<String>,
}

/// Parse an overview field, treating placeholders as absent
pub fn number(field: Option<&String>) -> Option<f64> {
    field
        .map(|s| s.trim())
        .filter(|s| !matches!(*s, "" | "None" | "-"))
        .and_then(|s| s.parse().ok())
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (free tier: 5)
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            rate_limiter: rate_limiter(rate_limit, FREE_TIER_RATE),
        }
    }

    /// Get company overview and fundamental data
    pub async fn company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::api(
                "Alpha Vantage",
                format!("HTTP error: {}", response.status()),
            ));
        }

        let data: serde_json::Value = response.json().await?;
        parse_overview(symbol, data)
    }
}

pub(crate) fn parse_overview(symbol: &str, data: serde_json::Value) -> Result<CompanyOverview> {
    if let Some(error) = data.get("Error Message") {
        return Err(StockError::api("Alpha Vantage", error.to_string()));
    }
    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(StockError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }
    if data.as_object().is_none_or(serde_json::Map::is_empty) {
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no company overview".to_string(),
        });
    }
    Ok(serde_json::from_value(data)?)
}
