//! Plain-text trace of a run

use async_trait::async_trait;
use crew_core::TokenUsage;
use crew_runtime::RunObserver;
use crew_tools::ToolOutcome;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::Result;

/// Characters of a tool result kept in the log
const PREVIEW_CHARS: usize = 500;

/// Usage summary appended after the trace
pub fn usage_block(usage: TokenUsage) -> String {
    format!(
        "\nUsage Details:\nPrompt Tokens: {}\nCompletion Tokens: {}\nTotal Tokens: {}\n",
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.total()
    )
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}... [truncated]", &text[..cut]),
        None => text.to_string(),
    }
}

/// Observer that writes each step of the run to a file
pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    /// Create (or truncate) the log file, creating parent directories
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the usage summary and flush
    pub async fn append_usage(&self, usage: TokenUsage) -> Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(usage_block(usage).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn write(&self, entry: String) {
        let mut file = self.file.lock().await;
        if let Err(e) = file.write_all(entry.as_bytes()).await {
            warn!(path = %self.path.display(), error = %e, "Failed to write run log");
        }
    }
}

#[async_trait]
impl RunObserver for RunLog {
    async fn on_task_start(&self, task: &str, role: &str, prompt: &str) {
        self.write(format!(
            "=== Task: {task} ===\nAgent: {role}\nPrompt:\n{prompt}\n\n"
        ))
        .await;
    }

    async fn on_llm_round(&self, role: &str, iteration: usize, usage: TokenUsage) {
        self.write(format!(
            "[{role}] model round {iteration}: prompt={} completion={}\n",
            usage.prompt_tokens, usage.completion_tokens
        ))
        .await;
    }

    async fn on_tool_start(&self, role: &str, tool: &str, input: &Value) {
        self.write(format!("[{role}] Using tool: {tool}\nTool input: {input}\n"))
            .await;
    }

    async fn on_tool_done(
        &self,
        role: &str,
        tool: &str,
        outcome: &ToolOutcome,
        rendered: &str,
        duration_ms: u64,
    ) {
        let status = if outcome.is_success() { "ok" } else { "failed" };
        self.write(format!(
            "[{role}] Tool {tool} {status} in {duration_ms} ms\nTool output:\n{}\n\n",
            preview(rendered)
        ))
        .await;
    }

    async fn on_task_done(&self, task: &str, role: &str, output: &str) {
        self.write(format!(
            "=== Task {task} finished ({role}) ===\nFinal Answer:\n{output}\n\n"
        ))
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_block_format() {
        assert_eq!(
            usage_block(TokenUsage::new(1200, 300)),
            "\nUsage Details:\nPrompt Tokens: 1200\nCompletion Tokens: 300\nTotal Tokens: 1500\n"
        );
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(PREVIEW_CHARS + 10);
        let cut = preview(&long);
        assert!(cut.ends_with("... [truncated]"));
        assert_eq!(cut.chars().filter(|c| *c == 'é').count(), PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn test_trace_then_usage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/run.txt");
        let log = RunLog::create(&path).await.unwrap();

        log.on_task_start("research", "Senior Stock Market Researcher", "Conduct research on ACME.")
            .await;
        log.on_tool_start("Senior Stock Market Researcher", "search_news", &json!({"query": "ACME"}))
            .await;
        log.on_tool_done(
            "Senior Stock Market Researcher",
            "search_news",
            &ToolOutcome::text("Title: x"),
            "Title: x",
            12,
        )
        .await;
        log.on_task_done("research", "Senior Stock Market Researcher", "NOTES")
            .await;
        log.append_usage(TokenUsage::new(10, 5)).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("=== Task: research ==="));
        assert!(text.contains("Using tool: search_news"));
        assert!(text.contains(r#"Tool input: {"query":"ACME"}"#));
        assert!(text.contains("Tool search_news ok in 12 ms"));
        assert!(text.contains("Final Answer:\nNOTES"));
        assert!(text.ends_with("Total Tokens: 15\n"));
    }
}
