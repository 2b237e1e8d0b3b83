//! Report rendering: Markdown, HTML and PDF artifacts
//!
//! The Markdown is written first so it survives a failed conversion.

use async_trait::async_trait;
use chrono::NaiveDate;
use pulldown_cmark::{Options, Parser, html};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::config::DEFAULT_PDF_COMMAND;
use crate::error::{Result, StockError};

const STYLESHEET: &str = "body { font-family: Helvetica, Arial, sans-serif; font-size: 11pt; \
line-height: 1.5; margin: 2em; color: #222; }
h1, h2, h3 { color: #1a3d5c; }
table { border-collapse: collapse; }
th, td { border: 1px solid #999; padding: 4px 8px; }";

/// The three artifact paths of one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub html: PathBuf,
    pub pdf: PathBuf,
}

impl ReportPaths {
    /// `{dir}/{symbol}_Stock_Report_{YYYY-MM-DD}.{md,html,pdf}`
    pub fn new(dir: impl AsRef<Path>, symbol: &str, date: NaiveDate) -> Self {
        let stem = format!("{symbol}_Stock_Report_{}", date.format("%Y-%m-%d"));
        let dir = dir.as_ref();
        Self {
            markdown: dir.join(format!("{stem}.md")),
            html: dir.join(format!("{stem}.html")),
            pdf: dir.join(format!("{stem}.pdf")),
        }
    }
}

/// Convert Markdown to a standalone HTML document
///
/// Deterministic: equal input gives byte-identical output.
pub fn markdown_to_html(markdown: &str, title: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, Parser::new_ext(markdown, options));

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>\n{STYLESHEET}\n</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// HTML → PDF conversion
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn convert(&self, html: &Path, pdf: &Path) -> Result<()>;
}

/// Runs an external converter such as `weasyprint {html} {pdf}`
#[derive(Debug, Clone)]
pub struct CommandPdfEngine {
    program: String,
    args: Vec<String>,
}

impl CommandPdfEngine {
    /// Parse a whitespace-separated command template
    pub fn new(template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| StockError::Config("pdf command is empty".to_string()))?;
        let args: Vec<String> = parts.collect();
        if !args.iter().any(|a| a.contains("{html}")) || !args.iter().any(|a| a.contains("{pdf}")) {
            return Err(StockError::Config(
                "pdf command must contain {html} and {pdf} placeholders".to_string(),
            ));
        }
        Ok(Self { program, args })
    }
}

impl Default for CommandPdfEngine {
    fn default() -> Self {
        Self {
            program: "weasyprint".to_string(),
            args: DEFAULT_PDF_COMMAND
                .split_whitespace()
                .skip(1)
                .map(str::to_string)
                .collect(),
        }
    }
}

#[async_trait]
impl PdfEngine for CommandPdfEngine {
    async fn convert(&self, html: &Path, pdf: &Path) -> Result<()> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                a.replace("{html}", &html.to_string_lossy())
                    .replace("{pdf}", &pdf.to_string_lossy())
            })
            .collect();
        debug!(program = %self.program, ?args, "Running PDF converter");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| StockError::Render(format!("could not start {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(StockError::Render(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if fs::metadata(pdf).await.is_err() {
            return Err(StockError::Render(format!(
                "{} did not produce {}",
                self.program,
                pdf.display()
            )));
        }
        Ok(())
    }
}

/// Writes the three artifacts for a report
pub struct ReportRenderer {
    results_dir: PathBuf,
    engine: Arc<dyn PdfEngine>,
}

impl ReportRenderer {
    pub fn new(results_dir: impl Into<PathBuf>, engine: Arc<dyn PdfEngine>) -> Self {
        Self {
            results_dir: results_dir.into(),
            engine,
        }
    }

    /// Write Markdown, HTML and PDF; returns every path
    #[instrument(skip(self, report))]
    pub async fn render(&self, report: &str, symbol: &str, date: NaiveDate) -> Result<ReportPaths> {
        fs::create_dir_all(&self.results_dir).await?;
        let paths = ReportPaths::new(&self.results_dir, symbol, date);

        fs::write(&paths.markdown, report).await?;
        let title = format!("{symbol} Stock Report {}", date.format("%Y-%m-%d"));
        fs::write(&paths.html, markdown_to_html(report, &title)).await?;
        self.engine.convert(&paths.html, &paths.pdf).await?;

        info!(
            markdown = %paths.markdown.display(),
            pdf = %paths.pdf.display(),
            "Report rendered"
        );
        Ok(paths)
    }
}
