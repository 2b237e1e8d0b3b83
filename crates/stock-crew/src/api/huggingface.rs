//! Hugging Face inference client for the financial-news sentiment model

use super::{SharedRateLimiter, http_client, rate_limiter};
use crate::error::{Result, StockError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::time::Duration;

/// Sentiment model served through the inference API
pub const SENTIMENT_MODEL: &str =
    "mrm8488/distilroberta-finetuned-financial-news-sentiment-analysis";

const BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

const RATE_LIMIT: NonZeroU32 = NonZeroU32::MIN.saturating_add(299);

/// One label score from a text-classification model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Classification responses come either nested per input or flat
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error { error: String },
}

/// Hugging Face inference API client
pub struct HuggingFaceClient {
    client: Client,
    token: String,
    model: String,
    rate_limiter: SharedRateLimiter,
}

impl HuggingFaceClient {
    /// Create a client for [`SENTIMENT_MODEL`]
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            token: token.into(),
            model: SENTIMENT_MODEL.to_string(),
            rate_limiter: rate_limiter(RATE_LIMIT.get(), RATE_LIMIT),
        }
    }

    /// Model id
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Raw per-label logits for one text
    ///
    /// The pipeline is asked not to apply its own activation so the caller
    /// sees the model's logits.
    pub async fn classify(&self, text: &str) -> Result<Vec<LabelScore>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(format!("{BASE_URL}/{}", self.model))
            .bearer_auth(&self.token)
            .json(&json!({
                "inputs": text,
                "parameters": { "function_to_apply": "none", "top_k": 3 }
            }))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(StockError::RateLimitExceeded {
                provider: "Hugging Face".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::api("Hugging Face", format!("HTTP {status}: {body}")));
        }

        let body: serde_json::Value = response.json().await?;
        parse_scores(body)
    }
}

/// Normalize a classification response to one list of label scores
pub(crate) fn parse_scores(body: serde_json::Value) -> Result<Vec<LabelScore>> {
    match serde_json::from_value::<ClassificationResponse>(body)? {
        ClassificationResponse::Batched(mut batches) => {
            if batches.is_empty() {
                return Err(StockError::api("Hugging Face", "empty classification response"));
            }
            Ok(batches.swap_remove(0))
        }
        ClassificationResponse::Flat(scores) => Ok(scores),
        ClassificationResponse::Error { error } => Err(StockError::api("Hugging Face", error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_and_flat() {
        let nested = serde_json::json!([[
            {"label": "positive", "score": 0.8},
            {"label": "neutral", "score": 0.15},
            {"label": "negative", "score": 0.05}
        ]]);
        let scores = parse_scores(nested).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].label, "positive");

        let flat = serde_json::json!([{"label": "negative", "score": 0.9}]);
        assert_eq!(parse_scores(flat).unwrap()[0].label, "negative");
    }

    #[test]
    fn test_parse_errors() {
        let loading = serde_json::json!({"error": "Model is currently loading"});
        let err = parse_scores(loading).unwrap_err();
        assert!(err.to_string().contains("loading"));

        assert!(parse_scores(serde_json::json!([])).is_err());
        assert!(parse_scores(serde_json::json!("nonsense")).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires HUGGINGFACE_API_TOKEN and network access
    async fn test_live_classify() {
        let token = std::env::var("HUGGINGFACE_API_TOKEN").unwrap();
        let client = HuggingFaceClient::new(token, Duration::from_secs(30));
        let scores = client.classify("Revenue beat expectations").await.unwrap();
        assert!(!scores.is_empty());
    }
}
