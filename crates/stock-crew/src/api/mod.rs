//! API clients for the crew's data providers

pub mod alpha_vantage;
pub mod huggingface;
pub mod reddit;
pub mod serper;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, CompanyOverview};
pub use huggingface::{HuggingFaceClient, SENTIMENT_MODEL};
pub use reddit::{RedditClient, RedditPost, validate_subreddit};
pub use serper::{SearchHit, SearchKind, SerperClient, format_hits};
pub use yahoo::{Candle, NewsItem, YahooFinanceClient, format_news};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Per-minute limiter; a zero rate falls back to `fallback`
pub(crate) fn rate_limiter(per_minute: u32, fallback: NonZeroU32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(fallback));
    Arc::new(RateLimiter::direct(quota))
}

/// HTTP client with the given request timeout
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}
