//! Time-bounded HTTP response cache with request-count telemetry.
//!
//! [`CachedFetcher`] fetches pages over HTTP, caches bodies in a
//! key-value store under a fixed TTL, and counts how many times each URL
//! has been requested. All durable state lives in the store; the fetcher
//! itself is stateless and safe to share across tasks.

pub mod fetcher;
pub mod http;


pub use fetcher::CachedFetcher;
pub use http::{FetchError, HttpClient, HttpResponse, ReqwestClient};
pub use webcache_common::{Result, WebCacheConfig, WebCacheError};
