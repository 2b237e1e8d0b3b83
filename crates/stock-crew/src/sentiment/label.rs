//! Sentiment labels and counts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the classifier's three classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// Model output order
    pub const ALL: [Self; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }

    /// Parse a model label, case-insensitively
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(label.trim()))
    }

    /// Softmax over `[negative, neutral, positive]` logits, then arg-max
    ///
    /// Ties resolve to the earlier label. Returns `None` for non-finite input.
    pub fn from_logits(logits: [f64; 3]) -> Option<Self> {
        if logits.iter().any(|l| !l.is_finite()) {
            return None;
        }
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp = logits.map(|l| (l - max).exp());
        let sum: f64 = exp.iter().sum();
        let probs = exp.map(|e| e / sum);

        let mut best = 0;
        for (i, p) in probs.iter().enumerate().skip(1) {
            if *p > probs[best] {
                best = i;
            }
        }
        Some(Self::ALL[best])
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-label tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub negative: u64,
    pub neutral: u64,
    pub positive: u64,
}

impl SentimentCounts {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Positive => self.positive += 1,
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.negative += other.negative;
        self.neutral += other.neutral;
        self.positive += other.positive;
    }

    pub fn total(&self) -> u64 {
        self.negative + self.neutral + self.positive
    }

    /// Counts keyed by label name
    pub fn to_map(&self) -> BTreeMap<String, u64> {
        BTreeMap::from([
            ("negative".to_string(), self.negative),
            ("neutral".to_string(), self.neutral),
            ("positive".to_string(), self.positive),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_logits() {
        assert_eq!(
            SentimentLabel::from_logits([2.1, -0.3, -1.8]),
            Some(SentimentLabel::Negative)
        );
        assert_eq!(
            SentimentLabel::from_logits([-1.0, 0.2, 3.4]),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(SentimentLabel::from_logits([0.0, f64::NAN, 0.0]), None);
    }

    #[test]
    fn test_ties_resolve_to_earlier_label() {
        assert_eq!(
            SentimentLabel::from_logits([1.0, 1.0, 1.0]),
            Some(SentimentLabel::Negative)
        );
        assert_eq!(
            SentimentLabel::from_logits([0.0, 2.0, 2.0]),
            Some(SentimentLabel::Neutral)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(SentimentLabel::parse("POSITIVE"), Some(SentimentLabel::Positive));
        assert_eq!(SentimentLabel::parse("LABEL_0"), None);
    }

    #[test]
    fn test_counts() {
        let mut counts = SentimentCounts::default();
        counts.record(SentimentLabel::Positive);
        counts.record(SentimentLabel::Positive);
        counts.record(SentimentLabel::Negative);

        let mut total = SentimentCounts::default();
        total.merge(&counts);
        total.merge(&counts);
        assert_eq!(total.total(), 6);
        assert_eq!(total.to_map()["positive"], 4);
        assert_eq!(total.to_map()["neutral"], 0);
    }
}
