//! Environment-based configuration
//!
//! Connection strings come from the environment (loaded from `.env` by the
//! binaries); engine tunables live in [`EngineConfig`] with documented
//! defaults.

use std::env;

/// Deployment environment name ("production", "sandbox", ...).
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Redis connection URL (job queue + market-data cache).
pub fn get_redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Postgres connection string for the durable store.
pub fn get_database_url() -> String {
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| "host=localhost user=sentrix dbname=sentrix".to_string())
}

/// Base URL of the execution collaborator.
pub fn get_execution_url() -> String {
    env::var("EXECUTION_URL").unwrap_or_else(|_| "http://127.0.0.1:9010".to_string())
}

/// Engine tunables with the documented defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Symbols eligible for admission and scheduled for evaluation.
    pub allowed_symbols: Vec<String>,
    /// Maximum signal age at admission, in seconds.
    pub freshness_window_secs: u64,
    /// Minimum confidence for a signal to be emitted and admitted.
    pub min_confidence: f64,
    /// Minimum source reliability score at admission.
    pub min_source_reliability: f64,
    /// Stop-loss offset from entry, as a fraction.
    pub stop_loss_pct: f64,
    /// Take-profit offset from entry, as a fraction.
    pub take_profit_pct: f64,
    /// Maximum holding duration before a timeout close, in seconds.
    pub max_hold_secs: i64,
    /// Candle refresh / signal evaluation cadence, in seconds.
    pub fetch_interval_secs: u64,
    /// Position supervision scan cadence, in seconds.
    pub scan_interval_secs: u64,
    /// Bounded worker pool size for one supervision scan.
    pub supervisor_concurrency: usize,
    /// Bounded wait for close confirmation before rollback, in milliseconds.
    pub close_confirm_timeout_ms: u64,
    /// Account/sizing defaults applied when an admitted signal opens a position.
    pub default_user_id: i64,
    pub default_quantity: f64,
    pub default_leverage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_symbols: vec!["BTC-PERP".to_string()],
            freshness_window_secs: 120,
            min_confidence: 0.6,
            min_source_reliability: 0.5,
            stop_loss_pct: 0.02,
            take_profit_pct: 0.04,
            max_hold_secs: 8 * 3600,
            fetch_interval_secs: 60,
            scan_interval_secs: 30,
            supervisor_concurrency: 8,
            close_confirm_timeout_ms: 3_000,
            default_user_id: 0,
            default_quantity: 1.0,
            default_leverage: 1.0,
        }
    }
}

impl EngineConfig {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(symbols) = env::var("ALLOWED_SYMBOLS") {
            let parsed: Vec<String> = symbols
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.allowed_symbols = parsed;
            }
        }

        if let Some(v) = read_parsed("FRESHNESS_WINDOW_SECONDS") {
            config.freshness_window_secs = v;
        }
        if let Some(v) = read_parsed("MIN_CONFIDENCE") {
            config.min_confidence = v;
        }
        if let Some(v) = read_parsed("MIN_SOURCE_RELIABILITY") {
            config.min_source_reliability = v;
        }
        if let Some(v) = read_parsed("MAX_HOLD_SECONDS") {
            config.max_hold_secs = v;
        }
        if let Some(v) = read_parsed("EVAL_INTERVAL_SECONDS") {
            config.fetch_interval_secs = v;
        }
        if let Some(v) = read_parsed("SCAN_INTERVAL_SECONDS") {
            config.scan_interval_secs = v;
        }
        if let Some(v) = read_parsed("SUPERVISOR_CONCURRENCY") {
            config.supervisor_concurrency = v;
        }
        if let Some(v) = read_parsed("CLOSE_CONFIRM_TIMEOUT_MS") {
            config.close_confirm_timeout_ms = v;
        }
        if let Some(v) = read_parsed("DEFAULT_QUANTITY") {
            config.default_quantity = v;
        }
        if let Some(v) = read_parsed("DEFAULT_LEVERAGE") {
            config.default_leverage = v;
        }

        config
    }
}

fn read_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
