//! Post classification

use super::SentimentLabel;
use crate::api::HuggingFaceClient;
use crate::error::{Result, StockError};
use async_trait::async_trait;

/// Assigns one of three sentiment labels to a text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentLabel>;
}

/// Classifier backed by the hosted financial-news sentiment model
pub struct HuggingFaceClassifier {
    client: HuggingFaceClient,
}

impl HuggingFaceClassifier {
    pub fn new(client: HuggingFaceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentLabel> {
        let scores = self.client.classify(text).await?;

        let mut logits = [None; 3];
        for score in &scores {
            if let Some(label) = SentimentLabel::parse(&score.label) {
                logits[label as usize] = Some(score.score);
            }
        }
        let [Some(negative), Some(neutral), Some(positive)] = logits else {
            return Err(StockError::api(
                "Hugging Face",
                format!("model {} did not score all three labels", self.client.model()),
            ));
        };

        SentimentLabel::from_logits([negative, neutral, positive])
            .ok_or_else(|| StockError::api("Hugging Face", "non-finite logits"))
    }
}
