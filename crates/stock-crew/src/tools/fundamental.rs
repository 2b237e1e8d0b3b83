//! Fundamental ratios from the company overview

use async_trait::async_trait;
use crew_llm::tools::schema;
use crew_tools::{Tool, ToolFailure, ToolOutcome, params};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::api::alpha_vantage::{AlphaVantageClient, CompanyOverview, number};

/// Ratio and margin fields reported when present
fn numeric_fields(o: &CompanyOverview) -> [(&'static str, Option<&String>); 20] {
    [
        ("pe_ratio", o.pe_ratio.as_ref()),
        ("forward_pe", o.forward_pe.as_ref()),
        ("peg_ratio", o.peg_ratio.as_ref()),
        ("price_to_book", o.price_to_book_ratio.as_ref()),
        ("price_to_sales", o.price_to_sales.as_ref()),
        ("ev_to_ebitda", o.ev_to_ebitda.as_ref()),
        ("ev_to_revenue", o.ev_to_revenue.as_ref()),
        ("profit_margin", o.profit_margin.as_ref()),
        ("operating_margin", o.operating_margin.as_ref()),
        ("return_on_equity", o.return_on_equity.as_ref()),
        ("return_on_assets", o.return_on_assets.as_ref()),
        ("quarterly_revenue_growth_yoy", o.quarterly_revenue_growth.as_ref()),
        ("quarterly_earnings_growth_yoy", o.quarterly_earnings_growth.as_ref()),
        ("eps", o.eps.as_ref()),
        ("beta", o.beta.as_ref()),
        ("dividend_yield", o.dividend_yield.as_ref()),
        ("week_52_high", o.week_52_high.as_ref()),
        ("week_52_low", o.week_52_low.as_ref()),
        ("analyst_target_price", o.analyst_target_price.as_ref()),
        ("market_cap", o.market_capitalization.as_ref()),
    ]
}

/// Structured summary of an overview
pub fn summarize(symbol: &str, overview: &CompanyOverview) -> Value {
    let mut out = Map::new();
    out.insert("symbol".into(), json!(symbol));
    out.insert("name".into(), json!(overview.name));
    out.insert("exchange".into(), json!(overview.exchange));
    out.insert("sector".into(), json!(overview.sector));
    out.insert("industry".into(), json!(overview.industry));

    for (key, raw) in numeric_fields(overview) {
        if let Some(v) = number(raw) {
            out.insert(key.into(), json!(v));
        }
    }

    if let Some(cap) = number(overview.market_capitalization.as_ref()) {
        out.insert("market_cap_formatted".into(), json!(format_market_cap(cap)));
    }
    if let Some(pe) = number(overview.pe_ratio.as_ref()) {
        out.insert("pe_interpretation".into(), json!(interpret_pe(pe)));
    }
    if let Some(peg) = number(overview.peg_ratio.as_ref()) {
        out.insert("peg_interpretation".into(), json!(interpret_peg(peg)));
    }
    if let Some(y) = number(overview.dividend_yield.as_ref()) {
        out.insert("dividend_yield_percent".into(), json!(format!("{:.2}%", y * 100.0)));
    }
    out.insert("data_provider".into(), json!("Alpha Vantage"));
    Value::Object(out)
}

/// Format market cap in human-readable form
fn format_market_cap(cap: f64) -> String {
    if cap >= 1_000_000_000_000.0 {
        format!("${:.2}T", cap / 1_000_000_000_000.0)
    } else if cap >= 1_000_000_000.0 {
        format!("${:.2}B", cap / 1_000_000_000.0)
    } else if cap >= 1_000_000.0 {
        format!("${:.2}M", cap / 1_000_000.0)
    } else {
        format!("${cap:.2}")
    }
}

/// Interpret P/E ratio
fn interpret_pe(pe: f64) -> &'static str {
    if pe < 0.0 {
        "Negative (company is not profitable)"
    } else if pe < 15.0 {
        "Low (potentially undervalued or slow growth)"
    } else if pe < 25.0 {
        "Moderate (fairly valued)"
    } else if pe < 50.0 {
        "High (potentially overvalued or high growth)"
    } else {
        "Very High (very expensive or very high growth expectations)"
    }
}

fn interpret_peg(peg: f64) -> &'static str {
    if peg < 0.0 {
        "Negative (earnings expected to shrink)"
    } else if peg < 1.0 {
        "Below 1 (growth priced cheaply)"
    } else if peg <= 2.0 {
        "Between 1 and 2 (growth fairly priced)"
    } else {
        "Above 2 (growth priced richly)"
    }
}

/// `yf_fundamental_analysis`: valuation, profitability and growth ratios
pub struct FundamentalAnalysisTool {
    client: Option<AlphaVantageClient>,
}

impl FundamentalAnalysisTool {
    /// Without a client every call reports "not configured"
    pub fn new(client: Option<AlphaVantageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for FundamentalAnalysisTool {
    async fn invoke(&self, input: Value) -> ToolOutcome {
        let ticker = match params::required_str(&input, "ticker") {
            Ok(t) => t.to_uppercase(),
            Err(failure) => return failure.into(),
        };
        let Some(client) = &self.client else {
            return ToolFailure::not_configured("ALPHA_VANTAGE_API_KEY is not set").into();
        };

        match client.company_overview(&ticker).await {
            Ok(overview) => {
                info!(symbol = %ticker, "Fetched company overview");
                ToolOutcome::structured(summarize(&ticker, &overview))
            }
            Err(e) => ToolFailure::upstream(e.to_string()).into(),
        }
    }

    fn name(&self) -> &str {
        "yf_fundamental_analysis"
    }

    fn description(&self) -> &str {
        "Fundamental analysis of a stock: P/E (trailing and forward), PEG, P/B, P/S, EV/EBITDA, \
         EV/revenue, margins, ROE, ROA, quarterly growth, EPS, beta, dividend yield, 52-week range, \
         analyst target price and market cap."
    }

    fn input_schema(&self) -> Value {
        schema::ticker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_tools::FailureKind;

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(1_500_000_000_000.0), "$1.50T");
        assert_eq!(format_market_cap(50_000_000_000.0), "$50.00B");
        assert_eq!(format_market_cap(250_000_000.0), "$250.00M");
    }

    #[test]
    fn test_interpretations() {
        assert!(interpret_pe(-5.0).contains("Negative"));
        assert!(interpret_pe(10.0).contains("Low"));
        assert!(interpret_pe(20.0).contains("Moderate"));
        assert!(interpret_pe(35.0).contains("High"));
        assert!(interpret_pe(75.0).contains("Very High"));
        assert!(interpret_peg(0.8).contains("cheaply"));
        assert!(interpret_peg(2.5).contains("richly"));
    }

    #[test]
    fn test_summarize_skips_placeholders() {
        let overview = CompanyOverview {
            name: Some("Acme Corp".into()),
            pe_ratio: Some("12.5".into()),
            peg_ratio: Some("None".into()),
            market_capitalization: Some("2500000000".into()),
            dividend_yield: Some("0.0125".into()),
            ..CompanyOverview::default()
        };
        let summary = summarize("ACME", &overview);

        assert_eq!(summary["symbol"], "ACME");
        assert_eq!(summary["pe_ratio"], 12.5);
        assert!(summary["pe_interpretation"].as_str().unwrap().starts_with("Low"));
        assert!(summary.get("peg_ratio").is_none());
        assert_eq!(summary["market_cap_formatted"], "$2.50B");
        assert_eq!(summary["dividend_yield_percent"], "1.25%");
    }

    #[tokio::test]
    async fn test_without_key_reports_not_configured() {
        let tool = FundamentalAnalysisTool::new(None);
        match tool.invoke(json!({"ticker": "ACME"})).await {
            ToolOutcome::Failed(failure) => assert_eq!(failure.kind, FailureKind::NotConfigured),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
