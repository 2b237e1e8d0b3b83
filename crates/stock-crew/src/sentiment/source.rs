//! Post sources

use crate::api::RedditClient;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A social post title and its creation time
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub created: DateTime<Utc>,
}

/// Fetches recent posts mentioning a symbol from one named source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn recent_posts(&self, source: &str, symbol: &str, limit: u32) -> Result<Vec<Post>>;
}

/// Subreddit search
pub struct RedditPostSource {
    client: RedditClient,
}

impl RedditPostSource {
    pub fn new(client: RedditClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostSource for RedditPostSource {
    async fn recent_posts(&self, source: &str, symbol: &str, limit: u32) -> Result<Vec<Post>> {
        let posts = self.client.search(source, symbol, limit).await?;
        Ok(posts
            .into_iter()
            .map(|p| Post {
                title: p.title,
                created: p.created,
            })
            .collect())
    }
}
