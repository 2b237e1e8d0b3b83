//! Multi-agent stock research crew
//!
//! Four role agents run in a fixed order to produce an investment report
//! for one ticker:
//!
//! - Senior Stock Market Researcher: news, web search and Reddit sentiment
//! - Expert Technical Analyst: indicators over one year of daily prices
//! - Senior Fundamental Analyst: valuation and profitability ratios
//! - Chief Investment Strategist: the final report, with every tool
//!
//! Each task sees every earlier task's output verbatim. The final report is
//! written as Markdown, HTML and PDF under the results directory, and a
//! step-by-step trace with token usage goes to the run log.
//!
//! # Example
//!
//! ```rust,ignore
//! use crew_utils::ProcessEnv;
//! use stock_crew::{CrewConfig, Credentials, run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CrewConfig::from_env(&ProcessEnv)?;
//!     let credentials = Credentials::from_env(&ProcessEnv);
//!
//!     let (report, pdf) = run("AAPL", "OpenAI GPT-4o Mini", &credentials, "run.log", &config).await?;
//!     println!("{} {}", report.display(), pdf.display());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod crew;
pub mod error;
pub mod render;
pub mod run;
pub mod runlog;
pub mod sentiment;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ToolCache;
pub use config::{CrewConfig, Credentials, RedditCredentials, RequiredKey};
pub use crew::{Stage, StockCrew};
pub use error::{Result, StockError};
pub use render::{CommandPdfEngine, PdfEngine, ReportPaths, ReportRenderer};
pub use run::{RunArtifact, Runner, run, validate_symbol};
pub use runlog::RunLog;
pub use sentiment::{SentimentCounts, SentimentLabel, SentimentReport, SentimentScorer};
pub use tools::{Capability, ToolSet};
