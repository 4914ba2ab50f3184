use std::time::Duration;

use async_trait::async_trait;

use webcache_common::config::HttpConfig;
use webcache_common::WebCacheError;

/// A fetched HTTP response, body decoded as text.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The single HTTP capability the fetcher consumes: GET a URL.
///
/// Tests substitute a stub; production uses [`ReqwestClient`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, timeout: Option<Duration>)
        -> Result<HttpResponse, FetchError>;
}

/// `reqwest`-backed HTTP client.
pub struct ReqwestClient {
    http: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, FetchError> {
        let mut request = self.http.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(map_reqwest_err)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_err)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_err(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else {
        FetchError::Http(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl From<FetchError> for WebCacheError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Timeout(msg) => WebCacheError::Timeout(msg),
            other => WebCacheError::Fetch(other.to_string()),
        }
    }
}
