use std::future::Future;
use std::time::{Duration, Instant};

use webcache_common::{Result, WebCacheConfig, WebCacheError};
use webcache_store::{Store, StoreError};

use crate::http::{FetchError, HttpClient};

/// Key prefix for cached response bodies.
pub const CACHE_PREFIX: &str = "cache:";

/// Key prefix for per-URL request counters.
pub const COUNT_PREFIX: &str = "count:";

/// Orchestrates cache lookup, fallback fetch, cache population, and call
/// counting for URLs.
///
/// Holds no mutable state of its own; everything durable lives in the
/// store, so a single instance serves any number of concurrent callers.
/// Both collaborators are constructor-injected, which is also the test
/// seam: a [`MemoryStore`](webcache_store::MemoryStore) plus an HTTP stub.
pub struct CachedFetcher<S, H> {
    store: S,
    http: H,
    ttl: Duration,
    http_timeout: Duration,
    op_timeout: Duration,
}

impl<S: Store, H: HttpClient> CachedFetcher<S, H> {
    pub fn new(store: S, http: H, config: &WebCacheConfig) -> Self {
        Self {
            store,
            http,
            ttl: config.ttl(),
            http_timeout: config.http_timeout(),
            op_timeout: config.op_timeout(),
        }
    }

    /// Fetch `url`, serving from the cache when a live entry exists.
    ///
    /// Every call that passes URL validation increments the per-URL
    /// counter, before the cache lookup and regardless of whether the
    /// rest of the call succeeds. The count reflects calls, not
    /// successes.
    ///
    /// On a miss the body is fetched over HTTP (2xx required), written
    /// to the store under the configured TTL, and returned.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let start = Instant::now();
        validate_url(url)?;

        let count_key = count_key(url);
        let cache_key = cache_key(url);

        let count = self.store_op(self.store.incr(&count_key)).await?;

        if let Some(cached) = self.store_op(self.store.get(&cache_key)).await? {
            metrics::counter!("webcache.cache.hit").increment(1);
            tracing::debug!(url = %url, count = count, "Cache hit");
            return Ok(String::from_utf8_lossy(&cached).into_owned());
        }
        metrics::counter!("webcache.cache.miss").increment(1);

        let response = self
            .http
            .get(url, Some(self.http_timeout))
            .await
            .map_err(WebCacheError::from)?;

        if !(200..300).contains(&response.status) {
            return Err(FetchError::Status {
                status: response.status,
                url: url.to_string(),
            }
            .into());
        }

        self.store_op(self.store.set_with_ttl(
            &cache_key,
            response.body.clone().into_bytes(),
            self.ttl,
        ))
        .await?;

        let latency = start.elapsed().as_secs_f64();
        metrics::histogram!("webcache.fetch.latency").record(latency);
        tracing::debug!(
            url = %url,
            status = response.status,
            count = count,
            "Fetched and cached"
        );

        Ok(response.body)
    }

    /// Current request count for `url`; zero if never fetched or reset.
    pub async fn get_count(&self, url: &str) -> Result<i64> {
        let key = count_key(url);
        let raw = self.store_op(self.store.get(&key)).await?;

        match raw {
            Some(bytes) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| {
                    WebCacheError::Store(format!("counter at {} is not an integer", key))
                }),
            None => Ok(0),
        }
    }

    /// Remove the counter for `url` entirely. A subsequent `get_count`
    /// returns zero and a subsequent `fetch` counts from one again.
    /// Resetting a URL with no counter is a no-op.
    pub async fn reset_count(&self, url: &str) -> Result<()> {
        self.store_op(self.store.delete(&count_key(url))).await?;
        Ok(())
    }

    /// Run a store operation under the configured deadline.
    async fn store_op<T>(
        &self,
        op: impl Future<Output = std::result::Result<T, StoreError>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result.map_err(WebCacheError::from),
            Err(_) => Err(StoreError::Timeout(format!(
                "store operation exceeded {:?}",
                self.op_timeout
            ))
            .into()),
        }
    }
}

fn cache_key(url: &str) -> String {
    format!("{}{}", CACHE_PREFIX, url)
}

fn count_key(url: &str) -> String {
    format!("{}{}", COUNT_PREFIX, url)
}

/// The only validation performed: the URL must parse as an absolute
/// http(s) URL.
fn validate_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| WebCacheError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(WebCacheError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            url, other
        ))),
    }
}
