use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WebCacheError;

/// Top-level library configuration, deserialized from webcache.toml.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebCacheConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Cache TTL configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cached response body TTL in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

/// HTTP client parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Key-value store connection parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store connection URL (e.g. "redis://localhost:6379").
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Per-operation deadline in milliseconds.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

fn default_ttl_seconds() -> u64 {
    10
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    "webcache/0.1".to_string()
}

fn default_store_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_op_timeout_ms() -> u64 {
    5_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl Default for WebCacheConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl WebCacheConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Environment Variables
    /// - `WEBCACHE_TTL` - cached body TTL in seconds (default: 10)
    /// - `WEBCACHE_HTTP_TIMEOUT_MS` - HTTP request timeout (default: 30000)
    /// - `WEBCACHE_USER_AGENT` - HTTP user agent (default: "webcache/0.1")
    /// - `WEBCACHE_STORE_URL` - store URL (default: "redis://localhost:6379")
    /// - `WEBCACHE_STORE_OP_TIMEOUT_MS` - store operation deadline (default: 5000)
    pub fn from_env() -> Self {
        Self {
            cache: CacheConfig {
                ttl_seconds: env_parsed("WEBCACHE_TTL", default_ttl_seconds()),
            },
            http: HttpConfig {
                timeout_ms: env_parsed("WEBCACHE_HTTP_TIMEOUT_MS", default_http_timeout_ms()),
                user_agent: std::env::var("WEBCACHE_USER_AGENT")
                    .unwrap_or_else(|_| default_user_agent()),
            },
            store: StoreConfig {
                url: std::env::var("WEBCACHE_STORE_URL").unwrap_or_else(|_| default_store_url()),
                op_timeout_ms: env_parsed(
                    "WEBCACHE_STORE_OP_TIMEOUT_MS",
                    default_op_timeout_ms(),
                ),
            },
        }
    }

    /// Cached body TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    /// HTTP request timeout as a `Duration`.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http.timeout_ms)
    }

    /// Store operation deadline as a `Duration`.
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.store.op_timeout_ms)
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Load configuration from a TOML file.
///
/// Fails loudly with clear error messages if anything is misconfigured.
pub fn load_config(path: &Path) -> Result<WebCacheConfig, ConfigError> {
    tracing::info!(path = %path.display(), "Loading configuration");

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: WebCacheConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    validate(&config)?;

    tracing::info!(
        ttl_seconds = config.cache.ttl_seconds,
        store_url = %config.store.url,
        "Configuration loaded"
    );

    Ok(config)
}

fn validate(config: &WebCacheConfig) -> Result<(), ConfigError> {
    if config.cache.ttl_seconds == 0 {
        return Err(ConfigError::Validation(
            "cache.ttl_seconds must be greater than zero".to_string(),
        ));
    }
    if config.http.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "http.timeout_ms must be greater than zero".to_string(),
        ));
    }
    if config.store.url.is_empty() {
        return Err(ConfigError::Validation(
            "store.url must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<ConfigError> for WebCacheError {
    fn from(e: ConfigError) -> Self {
        WebCacheError::Config(e.to_string())
    }
}
