//! Run entry point
//!
//! Order of a run: validate the symbol, resolve the model choice and its
//! provider key, open the run log, run the crew, append usage, render.
//! Every configuration failure surfaces before a tool or model call.

use crate::cache::ToolCache;
use crate::config::{CrewConfig, Credentials};
use crate::crew::StockCrew;
use crate::error::{Result, StockError};
use crate::render::{CommandPdfEngine, PdfEngine, ReportPaths, ReportRenderer};
use crate::runlog::RunLog;
use crate::tools::ToolSet;
use chrono::{Local, NaiveDate};
use crew_core::TokenUsage;
use crew_llm::{BackendSpec, LLMProvider, ModelChoice};
use crew_runtime::PipelineOutcome;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// The persisted result of one run
#[derive(Debug, Clone)]
pub struct RunArtifact {
    pub run_id: Uuid,
    pub symbol: String,
    pub date: NaiveDate,
    pub report: String,
    pub usage: TokenUsage,
    pub paths: ReportPaths,
}

/// Normalized (upper-case) ticker, or `InvalidSymbol`
pub fn validate_symbol(symbol: &str) -> Result<String> {
    let pattern = Regex::new(r"^\^?[A-Za-z0-9][A-Za-z0-9.=\-]{0,14}$")
        .map_err(|e| StockError::Config(format!("symbol pattern: {e}")))?;
    let symbol = symbol.trim();
    if !pattern.is_match(symbol) {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }
    Ok(symbol.to_ascii_uppercase())
}

/// Research `symbol` and render its report
///
/// Returns the Markdown report path and the PDF path.
pub async fn run(
    symbol: &str,
    model: &str,
    credentials: &Credentials,
    log_path: impl AsRef<Path>,
    config: &CrewConfig,
) -> Result<(PathBuf, PathBuf)> {
    let symbol = validate_symbol(symbol)?;
    let choice: ModelChoice = model.parse()?;
    let provider = credentials.provider(choice.provider())?;
    let engine = Arc::new(CommandPdfEngine::new(&config.pdf_command)?);

    let cache = ToolCache::new(config.tool_cache_ttl);
    let runner = Runner {
        config: config.clone(),
        backend: choice.spec(),
        provider,
        tools: ToolSet::from_config(config, &cache),
        engine,
    };

    let artifact = runner
        .execute(&symbol, log_path.as_ref(), Local::now().date_naive())
        .await?;
    Ok((artifact.paths.markdown, artifact.paths.pdf))
}

/// Text of the last task, which is the report
fn final_report(outcome: &PipelineOutcome) -> Result<String> {
    outcome
        .final_output()
        .map(|o| o.text.clone())
        .ok_or_else(|| {
            StockError::Pipeline(crew_core::Error::ProcessingFailed(
                "the crew produced no report".to_string(),
            ))
        })
}

/// A run with every collaborator supplied
pub struct Runner {
    pub config: CrewConfig,
    pub backend: BackendSpec,
    pub provider: Arc<dyn LLMProvider>,
    pub tools: ToolSet,
    pub engine: Arc<dyn PdfEngine>,
}

impl Runner {
    /// Run the crew for an already validated symbol
    #[instrument(skip(self, log_path), fields(model = %self.backend.model))]
    pub async fn execute(&self, symbol: &str, log_path: &Path, date: NaiveDate) -> Result<RunArtifact> {
        let run_id = Uuid::new_v4();
        info!(%run_id, symbol, provider = %self.backend.provider, "Starting run");

        let log = Arc::new(RunLog::create(log_path).await?);
        let crew = StockCrew::builder()
            .symbol(symbol)
            .backend(self.backend.clone())
            .provider(Arc::clone(&self.provider))
            .tools(self.tools.clone())
            .max_iterations(self.config.max_iterations)
            .max_tokens(self.config.max_tokens)
            .observer(log.clone())
            .build()?;

        let outcome = crew.kickoff().await?;
        log.append_usage(outcome.usage).await?;

        let report = final_report(&outcome)?;

        let renderer = ReportRenderer::new(&self.config.results_dir, Arc::clone(&self.engine));
        let paths = renderer.render(&report, symbol, date).await?;

        info!(
            %run_id,
            total_tokens = outcome.usage.total(),
            report = %paths.markdown.display(),
            "Run complete"
        );
        Ok(RunArtifact {
            run_id,
            symbol: symbol.to_string(),
            date,
            report,
            usage: outcome.usage,
            paths,
        })
    }
}
