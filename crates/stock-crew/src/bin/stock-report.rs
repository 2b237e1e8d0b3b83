//! Stock report CLI
//!
//! ```bash
//! stock-report --symbol AAPL
//! stock-report --symbol NVDA --model "Llama 3.1 70B" --log-file logs/nvda.log
//! stock-report --list-models
//! ```

use anyhow::Context;
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};
use crew_llm::ModelChoice;
use crew_utils::ProcessEnv;
use std::path::PathBuf;
use stock_crew::{CrewConfig, Credentials, run};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stock-report")]
#[command(about = "Research a stock with a crew of analyst agents and render an investment report")]
struct Args {
    /// Ticker symbol to research
    #[arg(short, long, required_unless_present = "list_models")]
    symbol: Option<String>,

    /// Model option (label or id, see --list-models)
    #[arg(short, long, default_value = "OpenAI GPT-4o Mini")]
    model: String,

    /// Where to write the step-by-step run log
    #[arg(short, long, default_value = "crew_output.log")]
    log_file: PathBuf,

    /// Directory for the report artifacts
    #[arg(short, long)]
    results_dir: Option<PathBuf>,

    /// Print the supported model options and exit
    #[arg(long)]
    list_models: bool,
}

fn print_models() {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Option", "Id", "Provider", "Model"]);
    for choice in ModelChoice::all() {
        table.add_row(vec![
            choice.label().to_string(),
            choice.id().to_string(),
            choice.provider().to_string(),
            choice.model().to_string(),
        ]);
    }
    println!("{table}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = crew_utils::load_dotenv();
    crew_utils::init_tracing_with("warn,stock_crew=info,crew_runtime=info");

    let args = Args::parse();
    if args.list_models {
        print_models();
        return Ok(());
    }
    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded .env");
    }

    let symbol = args.symbol.context("--symbol is required")?;
    let mut config = CrewConfig::from_env(&ProcessEnv).context("invalid configuration")?;
    if let Some(dir) = args.results_dir {
        config.results_dir = dir;
    }
    let credentials = Credentials::from_env(&ProcessEnv);

    let (report, pdf) = run(&symbol, &args.model, &credentials, &args.log_file, &config)
        .await
        .with_context(|| format!("report for {symbol} failed"))?;

    println!("Report: {}", report.display());
    println!("PDF: {}", pdf.display());
    Ok(())
}
