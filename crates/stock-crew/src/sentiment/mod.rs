//! Social sentiment scoring
//!
//! Recent posts mentioning a symbol are fetched per source, each title is
//! classified as negative, neutral or positive, and the labels are tallied.

pub mod classifier;
pub mod label;
pub mod scorer;
pub mod source;

pub use classifier::{HuggingFaceClassifier, SentimentClassifier};
pub use label::{SentimentCounts, SentimentLabel};
pub use scorer::{SentimentReport, SentimentScorer, SourceStatus};
pub use source::{Post, PostSource, RedditPostSource};

#[cfg(test)]
pub use classifier::MockSentimentClassifier;
#[cfg(test)]
pub use source::MockPostSource;
