//! Reddit client (application-only OAuth)

use super::{SharedRateLimiter, http_client, rate_limiter};
use crate::config::RedditCredentials;
use crate::error::{Result, StockError};
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";

/// Largest page the listing endpoints return
pub const MAX_PAGE_SIZE: u32 = 100;

/// Requests per minute allowed for an OAuth client
const RATE_LIMIT: NonZeroU32 = NonZeroU32::MIN.saturating_add(59);

/// Normalized subreddit name; an `r/` prefix is dropped
pub fn validate_subreddit(name: &str) -> Result<&str> {
    let pattern = Regex::new(r"^[A-Za-z0-9_]{2,21}$")
        .map_err(|e| StockError::Config(format!("subreddit pattern: {e}")))?;
    let trimmed = name.trim();
    let bare = trimmed.strip_prefix("r/").unwrap_or(trimmed);
    if pattern.is_match(bare) {
        Ok(bare)
    } else {
        Err(StockError::InvalidSubreddit(name.to_string()))
    }
}

/// Narrowest search time filter covering `window_days`
pub fn time_filter(window_days: u32) -> &'static str {
    match window_days {
        0..=1 => "day",
        2..=7 => "week",
        8..=31 => "month",
        32..=365 => "year",
        _ => "all",
    }
}

/// A post as returned by subreddit search
#[derive(Debug, Clone, PartialEq)]
pub struct RedditPost {
    pub title: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    #[serde(default)]
    title: String,
    created_utc: f64,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Reddit API client
pub struct RedditClient {
    client: Client,
    credentials: RedditCredentials,
    token: Mutex<Option<AccessToken>>,
    rate_limiter: SharedRateLimiter,
    time_filter: &'static str,
}

impl RedditClient {
    /// Create a new client
    pub fn new(credentials: RedditCredentials, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            credentials,
            token: Mutex::new(None),
            rate_limiter: rate_limiter(RATE_LIMIT.get(), RATE_LIMIT),
            time_filter: time_filter(30),
        }
    }

    /// Search far enough back to cover a look-back window
    pub fn with_window(mut self, window_days: u32) -> Self {
        self.time_filter = time_filter(window_days);
        self
    }

    /// Bearer token, refreshed shortly before it expires
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        self.rate_limiter.until_ready().await;
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(StockError::api("Reddit", "invalid client credentials"));
        }
        if !status.is_success() {
            return Err(StockError::api("Reddit", format!("token request failed: HTTP {status}")));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60));
        debug!(expires_in = token.expires_in, "Obtained Reddit access token");
        let value = token.access_token.clone();
        *guard = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        });
        Ok(value)
    }

    /// Newest posts in `subreddit` matching `query`, at most `limit`
    pub async fn search(&self, subreddit: &str, query: &str, limit: u32) -> Result<Vec<RedditPost>> {
        let subreddit = validate_subreddit(subreddit)?;
        let mut posts = Vec::new();
        let mut after: Option<String> = None;

        while (posts.len() as u32) < limit {
            let page_size = (limit - posts.len() as u32).min(MAX_PAGE_SIZE);
            let token = self.access_token().await?;
            self.rate_limiter.until_ready().await;

            let mut params = vec![
                ("q", query.to_string()),
                ("sort", "new".to_string()),
                ("t", self.time_filter.to_string()),
                ("restrict_sr", "1".to_string()),
                ("limit", page_size.to_string()),
            ];
            if let Some(cursor) = &after {
                params.push(("after", cursor.clone()));
            }

            let response = self
                .client
                .get(format!("{API_URL}/r/{subreddit}/search"))
                .bearer_auth(token)
                .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
                .query(&params)
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(StockError::RateLimitExceeded {
                    provider: "Reddit".to_string(),
                });
            }
            if !status.is_success() {
                return Err(StockError::api(
                    "Reddit",
                    format!("r/{subreddit} search failed: HTTP {status}"),
                ));
            }

            let body: serde_json::Value = response.json().await?;
            let (page, next) = parse_listing(&body)?;
            if page.is_empty() {
                break;
            }
            posts.extend(page);
            match next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        posts.truncate(limit as usize);
        Ok(posts)
    }
}

/// Parse one listing page into posts and the next-page cursor
pub(crate) fn parse_listing(body: &serde_json::Value) -> Result<(Vec<RedditPost>, Option<String>)> {
    let listing: Listing = serde_json::from_value(body.clone())?;
    let posts = listing
        .data
        .children
        .into_iter()
        .filter_map(|child| {
            let created = DateTime::from_timestamp(child.data.created_utc as i64, 0);
            if created.is_none() {
                warn!(title = %child.data.title, "Skipping post with invalid timestamp");
            }
            created.map(|created| RedditPost {
                title: child.data.title,
                created,
            })
        })
        .collect();
    Ok((posts, listing.data.after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing() {
        let body = json!({
            "kind": "Listing",
            "data": {
                "after": "t3_abc",
                "children": [
                    {"kind": "t3", "data": {"title": "ACME to the moon", "created_utc": 1_704_067_200.0}},
                    {"kind": "t3", "data": {"title": "ACME earnings thread", "created_utc": 1_704_153_600.0}}
                ]
            }
        });
        let (posts, after) = parse_listing(&body).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "ACME to the moon");
        assert_eq!(posts[0].created.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(after.as_deref(), Some("t3_abc"));
    }

    #[test]
    fn test_parse_last_page() {
        let body = json!({"data": {"after": null, "children": []}});
        let (posts, after) = parse_listing(&body).unwrap();
        assert!(posts.is_empty());
        assert!(after.is_none());

        assert!(parse_listing(&json!({"error": 403})).is_err());
    }

    #[test]
    fn test_subreddit_names() {
        assert_eq!(validate_subreddit("wallstreetbets").unwrap(), "wallstreetbets");
        assert_eq!(validate_subreddit(" r/stocks ").unwrap(), "stocks");
        let too_long = "x".repeat(22);
        for bad in ["", "a", "stocks/../../api", "stocks?q=x", "two words", too_long.as_str()] {
            assert!(
                matches!(validate_subreddit(bad), Err(StockError::InvalidSubreddit(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_time_filter_covers_window() {
        assert_eq!(time_filter(1), "day");
        assert_eq!(time_filter(7), "week");
        assert_eq!(time_filter(30), "month");
        assert_eq!(time_filter(90), "year");
        assert_eq!(time_filter(400), "all");
    }

    #[tokio::test]
    async fn test_invalid_subreddit_rejected_before_request() {
        let credentials = RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "stock-crew-tests".to_string(),
        };
        let client = RedditClient::new(credentials, Duration::from_secs(1)).with_window(90);
        assert_eq!(client.time_filter, "year");

        let result = client.search("../api/v1/me", "ACME", 10).await;
        assert!(matches!(result, Err(StockError::InvalidSubreddit(_))));
    }

    #[tokio::test]
    #[ignore] // Requires Reddit credentials and network access
    async fn test_live_search() {
        let credentials = RedditCredentials {
            client_id: std::env::var("REDDIT_CLIENT_ID").unwrap(),
            client_secret: std::env::var("REDDIT_CLIENT_SECRET").unwrap(),
            user_agent: std::env::var("REDDIT_USER_AGENT").unwrap(),
        };
        let client = RedditClient::new(credentials, Duration::from_secs(30));
        let posts = client.search("stocks", "AAPL", 10).await.unwrap();
        assert!(posts.len() <= 10);
    }
}
