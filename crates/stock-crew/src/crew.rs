//! The stock-report crew: four roles, four tasks, run in a fixed order

use crate::error::{Result, StockError};
use crate::tools::{Capability, ToolSet};
use crew_core::Agent;
use crew_llm::{BackendSpec, LLMProvider};
use crew_prompt::TaskTemplate;
use crew_runtime::{CrewAgent, Pipeline, PipelineOutcome, RunObserver, Task};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// Template placeholder every prompt is rendered with
pub const SYMBOL_PLACEHOLDER: &str = "stock_symbol";

/// Variables the crew's templates are rendered with
#[derive(Debug, Clone, Serialize)]
pub struct CrewInputs<'a> {
    pub stock_symbol: &'a str,
}

/// Pipeline position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Research,
    Technical,
    Fundamental,
    Report,
    Done,
}

impl Stage {
    /// The stage that follows; `Done` is terminal
    pub fn next(self) -> Self {
        match self {
            Self::Research => Self::Technical,
            Self::Technical => Self::Fundamental,
            Self::Fundamental => Self::Report,
            Self::Report | Self::Done => Self::Done,
        }
    }

    /// Working stages in execution order
    pub fn sequence() -> impl Iterator<Item = Self> {
        std::iter::successors(Some(Self::Research), |s| Some(s.next()))
            .take_while(|s| *s != Self::Done)
    }

    /// Task name recorded in outputs and the run log
    pub fn task_name(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Technical => "technical_analysis",
            Self::Fundamental => "fundamental_analysis",
            Self::Report => "report",
            Self::Done => "done",
        }
    }

    fn role(self) -> Option<&'static RoleSpec> {
        match self {
            Self::Research => Some(&RESEARCHER),
            Self::Technical => Some(&TECHNICAL_ANALYST),
            Self::Fundamental => Some(&FUNDAMENTAL_ANALYST),
            Self::Report => Some(&REPORTER),
            Self::Done => None,
        }
    }

    fn task(self) -> Option<&'static TaskSpec> {
        match self {
            Self::Research => Some(&RESEARCH_TASK),
            Self::Technical => Some(&TECHNICAL_TASK),
            Self::Fundamental => Some(&FUNDAMENTAL_TASK),
            Self::Report => Some(&REPORT_TASK),
            Self::Done => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

struct RoleSpec {
    role: &'static str,
    goal: &'static str,
    backstory: &'static str,
    capabilities: &'static [Capability],
}

struct TaskSpec {
    description: &'static str,
    expected_output: &'static str,
}

static RESEARCHER: RoleSpec = RoleSpec {
    role: "Senior Stock Market Researcher",
    goal: "Gather and analyze comprehensive data about {{ stock_symbol }}",
    backstory: "With a Ph.D. in Financial Economics and 15 years of experience in equity \
                research, you're known for your meticulous data collection and insightful analysis.",
    capabilities: &[
        Capability::RedditSentiment,
        Capability::WebSearch,
        Capability::NewsSearch,
        Capability::YahooFinanceNews,
    ],
};

static TECHNICAL_ANALYST: RoleSpec = RoleSpec {
    role: "Expert Technical Analyst",
    goal: "Perform an in-depth technical analysis on {{ stock_symbol }}",
    backstory: "As a Chartered Market Technician (CMT) with 15 years of experience, you have a \
                keen eye for chart patterns and market trends.",
    capabilities: &[Capability::TechnicalAnalysis],
};

static FUNDAMENTAL_ANALYST: RoleSpec = RoleSpec {
    role: "Senior Fundamental Analyst",
    goal: "Conduct a comprehensive fundamental analysis of {{ stock_symbol }}",
    backstory: "With a CFA charter and 15 years of experience in value investing, you dissect \
                financial statements and identify key value drivers.",
    capabilities: &[Capability::FundamentalAnalysis],
};

static REPORTER: RoleSpec = RoleSpec {
    role: "Chief Investment Strategist",
    goal: "Synthesize all analyses to create a definitive investment report on {{ stock_symbol }}",
    backstory: "As a seasoned investment strategist with 20 years of experience, you weave \
                complex financial data into compelling investment narratives.",
    capabilities: &Capability::ALL,
};

static RESEARCH_TASK: TaskSpec = TaskSpec {
    description: "Conduct research on {{ stock_symbol }}. Your analysis should include:
1. Current stock price and historical performance (5 years).
2. Key financial metrics (P/E, EPS growth, revenue growth, margins).
3. Recent news and press releases (1 month).
4. Analyst ratings and price targets (min 3 analysts).
5. Reddit sentiment analysis (100 posts).
6. Major institutional holders and recent changes.
7. Competitive landscape and {{ stock_symbol }}'s market share.
Use reputable financial websites for data.",
    expected_output: "A detailed 150-word research report with data sources and brief analysis.",
};

static TECHNICAL_TASK: TaskSpec = TaskSpec {
    description: "Perform technical analysis on {{ stock_symbol }}. Include:
1. 50-day and 200-day moving averages (1 year).
2. Key support and resistance levels (3 each).
3. RSI and MACD indicators.
4. Volume analysis (3 months).
5. Significant chart patterns (6 months).
6. Fibonacci retracement levels.
7. Comparison with sector's average.
Use the yf_tech_analysis tool for data.",
    expected_output: "A 100-word technical analysis report with buy/sell/hold signals and \
                      annotated charts.",
};

static FUNDAMENTAL_TASK: TaskSpec = TaskSpec {
    description: "Conduct fundamental analysis of {{ stock_symbol }}. Include:
1. Review last 3 years of financial statements.
2. Key ratios (P/E, P/B, P/S, PEG, Debt-to-Equity, etc.).
3. Comparison with main competitors and industry averages.
4. Revenue and earnings growth trends.
5. Management effectiveness (ROE, capital allocation).
6. Competitive advantages and market position.
7. Growth catalysts and risks (2-3 years).
8. DCF valuation model with assumptions.
Use yf_fundamental_analysis tool for data.",
    expected_output: "A 100-word fundamental analysis report with buy/hold/sell recommendation \
                      and key metrics summary.",
};

static REPORT_TASK: TaskSpec = TaskSpec {
    description: "Create an investment report on {{ stock_symbol }}. Include:
1. Executive Summary: Investment recommendation.
2. Company Snapshot: Key facts.
3. Financial Highlights: Top metrics and peer comparison.
4. Technical Analysis: Key findings.
5. Fundamental Analysis: Top strengths and concerns.
6. Risk and Opportunity: Major risk and growth catalyst.
7. Reddit Sentiment: Key takeaway from sentiment analysis, including the number of positive, \
negative and neutral comments and total comments.
8. Investment Thesis: Bull and bear cases.
9. Price Target: 12-month forecast.
",
    expected_output: "A 600-word investment report with clear sections, key insights.",
};

/// The assembled crew for one symbol
pub struct StockCrew {
    symbol: String,
    pipeline: Pipeline,
}

impl StockCrew {
    /// Create a builder
    pub fn builder() -> StockCrewBuilder {
        StockCrewBuilder::default()
    }

    /// Symbol the crew was built for
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[Task] {
        self.pipeline.tasks()
    }

    /// Run every stage; the last output is the report
    #[instrument(skip(self), fields(symbol = %self.symbol))]
    pub async fn kickoff(&self) -> Result<PipelineOutcome> {
        let inputs = CrewInputs {
            stock_symbol: &self.symbol,
        };
        let outcome = self.pipeline.run(&inputs).await?;
        info!(
            tasks = outcome.outputs.len(),
            prompt_tokens = outcome.usage.prompt_tokens,
            completion_tokens = outcome.usage.completion_tokens,
            "Crew finished"
        );
        Ok(outcome)
    }
}

/// Builder for StockCrew
#[derive(Default)]
pub struct StockCrewBuilder {
    symbol: Option<String>,
    backend: Option<BackendSpec>,
    provider: Option<Arc<dyn LLMProvider>>,
    tools: Option<ToolSet>,
    max_iterations: Option<usize>,
    max_tokens: Option<usize>,
    observer: Option<Arc<dyn RunObserver>>,
}

impl StockCrewBuilder {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn backend(mut self, backend: BackendSpec) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tools(mut self, tools: ToolSet) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the four agents and their tasks
    pub fn build(self) -> Result<StockCrew> {
        let symbol = self
            .symbol
            .ok_or_else(|| StockError::Config("crew symbol not set".to_string()))?;
        let backend = self
            .backend
            .ok_or_else(|| StockError::Config("crew model backend not set".to_string()))?;
        let provider = self
            .provider
            .ok_or_else(|| StockError::Config("crew model provider not set".to_string()))?;
        let tools = self.tools.unwrap_or_default();
        let inputs = CrewInputs {
            stock_symbol: &symbol,
        };

        let mut tasks = Vec::new();
        for stage in Stage::sequence() {
            let (Some(role), Some(spec)) = (stage.role(), stage.task()) else {
                continue;
            };

            let goal = TaskTemplate::new(
                format!("{stage}_goal"),
                role.goal,
                &[SYMBOL_PLACEHOLDER],
            )?
            .render(&inputs)?;

            let mut agent = CrewAgent::builder()
                .role(role.role)
                .goal(goal)
                .backstory(role.backstory)
                .provider(Arc::clone(&provider))
                .backend(backend.clone())
                .tools(tools.resolve(role.capabilities)?);
            if let Some(max) = self.max_iterations {
                agent = agent.max_iterations(max);
            }
            if let Some(max_tokens) = self.max_tokens {
                agent = agent.max_tokens(max_tokens);
            }
            if let Some(observer) = &self.observer {
                agent = agent.observer(Arc::clone(observer));
            }
            let agent: Arc<dyn Agent> = Arc::new(agent.build()?);

            let description =
                TaskTemplate::new(stage.task_name(), spec.description, &[SYMBOL_PLACEHOLDER])?;
            tasks.push(Task::new(
                stage.task_name(),
                description,
                spec.expected_output,
                agent,
            ));
        }

        let mut pipeline = Pipeline::new(tasks)?;
        if let Some(observer) = self.observer {
            pipeline = pipeline.with_observer(observer);
        }
        Ok(StockCrew { symbol, pipeline })
    }
}
