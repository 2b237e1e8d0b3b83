//! Technical analysis over one year of daily candles

use async_trait::async_trait;
use crew_llm::tools::schema;
use crew_tools::{Tool, ToolFailure, ToolOutcome, params};
use serde::Serialize;
use serde_json::{Value, json};
use ta::{
    DataItem, Next,
    indicators::{
        AverageTrueRange, BollingerBands, MovingAverageConvergenceDivergence,
        RelativeStrengthIndex, SimpleMovingAverage,
    },
};
use tracing::info;

use crate::api::{Candle, YahooFinanceClient};
use crate::error::{Result, StockError};

/// Calendar days of history fetched
const HISTORY_DAYS: i64 = 365;
/// Fewest bars the indicators are computed on
const MIN_BARS: usize = 30;
/// Trading days in three and six months
const QUARTER_BARS: usize = 63;
const HALF_YEAR_BARS: usize = 126;
/// Bars on each side of a swing point
const SWING_WINDOW: usize = 5;
/// Support and resistance levels reported per side
const LEVELS: usize = 3;
const FIB_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Indicator snapshot for the latest bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSummary {
    pub last_close: f64,
    pub bars: usize,
    /// `None` with fewer than 50 bars
    pub sma_50: Option<f64>,
    /// `None` with fewer than 200 bars
    pub sma_200: Option<f64>,
    pub moving_average_cross: Option<&'static str>,
    pub rsi_14: f64,
    pub rsi_signal: &'static str,
    pub macd: MacdReading,
    pub bollinger: BollingerReading,
    pub atr_14: f64,
    pub avg_volume_3m: f64,
    pub avg_volume_1y: f64,
    pub volume_trend: &'static str,
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
    pub year_high: f64,
    pub year_low: f64,
    pub fibonacci: Vec<FibonacciLevel>,
    pub change_6m_pct: Option<f64>,
}

impl TechnicalSummary {
    /// Compute the snapshot from candles in chronological order
    pub fn compute(candles: &[Candle]) -> Result<Self> {
        if candles.len() < MIN_BARS {
            return Err(StockError::Indicator(format!(
                "need at least {MIN_BARS} daily bars, got {}",
                candles.len()
            )));
        }
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let last_close = closes[closes.len() - 1];

        let sma_50 = last_sma(&closes, 50)?;
        let sma_200 = last_sma(&closes, 200)?;
        let moving_average_cross = match (sma_50, sma_200) {
            (Some(fast), Some(slow)) if fast > slow => Some("golden cross (SMA-50 above SMA-200)"),
            (Some(_), Some(_)) => Some("death cross (SMA-50 below SMA-200)"),
            _ => None,
        };

        let mut rsi = RelativeStrengthIndex::new(14).map_err(indicator)?;
        let mut macd = MovingAverageConvergenceDivergence::new(12, 26, 9).map_err(indicator)?;
        let mut bb = BollingerBands::new(20, 2.0).map_err(indicator)?;
        let mut atr = AverageTrueRange::new(14).map_err(indicator)?;

        let mut rsi_14 = 0.0;
        let mut macd_out = MacdReading { macd: 0.0, signal: 0.0, histogram: 0.0 };
        let mut bb_out = BollingerReading { upper: 0.0, middle: 0.0, lower: 0.0 };
        let mut atr_14 = 0.0;

        for candle in candles {
            rsi_14 = rsi.next(candle.close);
            let m = macd.next(candle.close);
            macd_out = MacdReading {
                macd: m.macd,
                signal: m.signal,
                histogram: m.histogram,
            };
            let b = bb.next(candle.close);
            bb_out = BollingerReading {
                upper: b.upper,
                middle: b.average,
                lower: b.lower,
            };
            atr_14 = atr.next(&bar(candle)?);
        }

        let avg_volume_1y = mean(candles.iter().map(|c| c.volume as f64));
        let recent = &candles[candles.len().saturating_sub(QUARTER_BARS)..];
        let avg_volume_3m = mean(recent.iter().map(|c| c.volume as f64));
        let volume_trend = if avg_volume_3m > avg_volume_1y * 1.1 {
            "rising"
        } else if avg_volume_3m < avg_volume_1y * 0.9 {
            "falling"
        } else {
            "stable"
        };

        let year_high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let year_low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let fibonacci = FIB_RATIOS
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: round2(year_high - (year_high - year_low) * ratio),
            })
            .collect();

        let (support, resistance) = swing_levels(candles, last_close);

        let change_6m_pct = (closes.len() > HALF_YEAR_BARS)
            .then(|| closes[closes.len() - 1 - HALF_YEAR_BARS])
            .filter(|base| *base > 0.0)
            .map(|base| round2((last_close - base) / base * 100.0));

        Ok(Self {
            last_close,
            bars: candles.len(),
            sma_50,
            sma_200,
            moving_average_cross,
            rsi_14,
            rsi_signal: interpret_rsi(rsi_14),
            macd: macd_out,
            bollinger: bb_out,
            atr_14,
            avg_volume_3m,
            avg_volume_1y,
            volume_trend,
            support,
            resistance,
            year_high,
            year_low,
            fibonacci,
            change_6m_pct,
        })
    }
}

fn indicator(e: ta::errors::TaError) -> StockError {
    StockError::Indicator(e.to_string())
}

/// A bar whose high and low enclose its open and close
fn bar(candle: &Candle) -> Result<DataItem> {
    let high = candle.high.max(candle.open).max(candle.close);
    let low = candle.low.min(candle.open).min(candle.close);
    DataItem::builder()
        .open(candle.open)
        .high(high)
        .low(low)
        .close(candle.close)
        .volume(candle.volume as f64)
        .build()
        .map_err(indicator)
}

fn last_sma(closes: &[f64], period: usize) -> Result<Option<f64>> {
    if closes.len() < period {
        return Ok(None);
    }
    let mut sma = SimpleMovingAverage::new(period).map_err(indicator)?;
    Ok(closes.iter().fold(None, |_, &c| Some(sma.next(c))))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Nearest swing lows below and swing highs above `price`
fn swing_levels(candles: &[Candle], price: f64) -> (Vec<f64>, Vec<f64>) {
    let mut lows = Vec::new();
    let mut highs = Vec::new();
    for i in SWING_WINDOW..candles.len().saturating_sub(SWING_WINDOW) {
        let window = &candles[i - SWING_WINDOW..=i + SWING_WINDOW];
        let c = &candles[i];
        if window.iter().all(|w| w.low >= c.low) && c.low < price {
            lows.push(round2(c.low));
        }
        if window.iter().all(|w| w.high <= c.high) && c.high > price {
            highs.push(round2(c.high));
        }
    }

    lows.sort_by(|a, b| b.total_cmp(a));
    lows.dedup();
    lows.truncate(LEVELS);
    highs.sort_by(f64::total_cmp);
    highs.dedup();
    highs.truncate(LEVELS);
    (lows, highs)
}

/// Interpret RSI value
pub fn interpret_rsi(rsi: f64) -> &'static str {
    if rsi > 70.0 {
        "Overbought - potential sell signal"
    } else if rsi < 30.0 {
        "Oversold - potential buy signal"
    } else {
        "Neutral"
    }
}

/// `yf_tech_analysis`: indicator snapshot for a ticker
pub struct TechnicalAnalysisTool {
    yahoo: YahooFinanceClient,
}

impl TechnicalAnalysisTool {
    pub fn new(yahoo: YahooFinanceClient) -> Self {
        Self { yahoo }
    }

    async fn analyze(&self, ticker: &str) -> std::result::Result<TechnicalSummary, ToolFailure> {
        let candles = self
            .yahoo
            .daily_history(ticker, HISTORY_DAYS)
            .await
            .map_err(|e| ToolFailure::upstream(e.to_string()))?;
        TechnicalSummary::compute(&candles).map_err(|e| ToolFailure::upstream(e.to_string()))
    }
}

#[async_trait]
impl Tool for TechnicalAnalysisTool {
    async fn invoke(&self, input: Value) -> ToolOutcome {
        let ticker = match params::required_str(&input, "ticker") {
            Ok(t) => t.to_uppercase(),
            Err(failure) => return failure.into(),
        };

        match self.analyze(&ticker).await {
            Ok(summary) => {
                info!(symbol = %ticker, bars = summary.bars, "Computed technical summary");
                let mut value = json!(summary);
                value["symbol"] = json!(ticker);
                ToolOutcome::structured(value)
            }
            Err(failure) => failure.into(),
        }
    }

    fn name(&self) -> &str {
        "yf_tech_analysis"
    }

    fn description(&self) -> &str {
        "Technical analysis of a stock from one year of daily prices: SMA-50/200 and cross state, \
         RSI-14, MACD, Bollinger Bands, ATR, 3-month vs 1-year volume, support and resistance \
         levels, Fibonacci retracements and 6-month change."
    }

    fn input_schema(&self) -> Value {
        schema::ticker()
    }
}
