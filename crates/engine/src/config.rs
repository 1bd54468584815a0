/// Engine tuning loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Extra attempts after a contended transaction (default: `3`).
    pub max_retries: u32,
    /// Backoff step between attempts; attempt `n` waits `n * step`
    /// (default: `25` ms).
    pub retry_backoff_ms: u64,
    /// `SET LOCAL lock_timeout` for every write transaction (default: `2000` ms).
    pub lock_timeout_ms: u64,
    /// Page size of the open-request feed when the caller gives none
    /// (default: `20`).
    pub feed_default_limit: i64,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `ENGINE_MAX_RETRIES`     | `3`     |
    /// | `ENGINE_RETRY_BACKOFF_MS`| `25`    |
    /// | `ENGINE_LOCK_TIMEOUT_MS` | `2000`  |
    /// | `FEED_DEFAULT_LIMIT`     | `20`    |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_retries: u32 = std::env::var("ENGINE_MAX_RETRIES")
            .map(|v| v.parse().expect("ENGINE_MAX_RETRIES must be a valid u32"))
            .unwrap_or(defaults.max_retries);

        let retry_backoff_ms: u64 = std::env::var("ENGINE_RETRY_BACKOFF_MS")
            .map(|v| v.parse().expect("ENGINE_RETRY_BACKOFF_MS must be a valid u64"))
            .unwrap_or(defaults.retry_backoff_ms);

        let lock_timeout_ms: u64 = std::env::var("ENGINE_LOCK_TIMEOUT_MS")
            .map(|v| v.parse().expect("ENGINE_LOCK_TIMEOUT_MS must be a valid u64"))
            .unwrap_or(defaults.lock_timeout_ms);

        let feed_default_limit: i64 = std::env::var("FEED_DEFAULT_LIMIT")
            .map(|v| v.parse().expect("FEED_DEFAULT_LIMIT must be a valid i64"))
            .unwrap_or(defaults.feed_default_limit);

        Self {
            max_retries,
            retry_backoff_ms,
            lock_timeout_ms,
            feed_default_limit,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff_ms: 25,
            lock_timeout_ms: 2000,
            feed_default_limit: chamba_core::service_request::DEFAULT_FEED_LIMIT,
        }
    }
}
