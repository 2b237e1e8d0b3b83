//! Tool result cache
//!
//! Identical tool calls within one run (same tool, same arguments) are
//! answered from memory. Only successful outcomes are stored, so a
//! transient upstream failure is retried on the next call.

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use crew_tools::{Tool, ToolOutcome};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache key for a tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Tool name
    pub tool: String,
    /// Arguments serialized with sorted object keys
    pub input: String,
}

impl CacheKey {
    /// Create a key from a tool name and its arguments
    pub fn new(tool: impl Into<String>, input: &Value) -> Self {
        Self {
            tool: tool.into(),
            input: input.to_string(),
        }
    }
}

/// Shared cache of successful tool outcomes
#[derive(Clone)]
pub struct ToolCache {
    cache: Arc<RwLock<TimedCache<CacheKey, ToolOutcome>>>,
}

impl ToolCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<ToolOutcome> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: ToolOutcome) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached outcome or run `fetcher`, caching it on success
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetcher: F) -> ToolOutcome
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ToolOutcome>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(tool = %key.tool, "Tool cache hit");
            return value;
        }

        let value = fetcher().await;
        if value.is_success() {
            self.insert(key, value.clone()).await;
        }
        value
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Wrap a tool so its calls go through this cache
    pub fn wrap(&self, tool: Arc<dyn Tool>) -> Arc<dyn Tool> {
        Arc::new(CachedTool {
            inner: tool,
            cache: self.clone(),
        })
    }
}

/// A tool whose successful outcomes are memoized
pub struct CachedTool {
    inner: Arc<dyn Tool>,
    cache: ToolCache,
}

#[async_trait]
impl Tool for CachedTool {
    async fn invoke(&self, input: Value) -> ToolOutcome {
        let key = CacheKey::new(self.inner.name(), &input);
        self.cache
            .get_or_fetch(key, || self.inner.invoke(input))
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn input_schema(&self) -> Value {
        self.inner.input_schema()
    }
}
