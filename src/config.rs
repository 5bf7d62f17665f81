use std::time::Duration;
use thiserror::Error;

/// Default host for the Alpaca market data API
const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets";

/// Default host for the Alpaca trading API (market clock)
const DEFAULT_TRADING_URL: &str = "https://api.alpaca.markets";

/// Configuration errors raised at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Alpaca API credentials and endpoints
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// Value for the APCA-API-KEY-ID header
    pub api_key_id: String,

    /// Value for the APCA-API-SECRET-KEY header
    pub api_secret_key: String,

    /// Base URL of the market data API
    pub data_base_url: String,

    /// Base URL of the trading API
    pub trading_base_url: String,

    /// Hard timeout applied to every outbound request
    pub request_timeout: Duration,
}

/// Pacing knobs for the market-clock scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of in-flight fetch+insert batches per tick
    pub max_concurrent_batches: usize,

    /// Extra delay after each minute boundary so the provider has
    /// finished assembling the previous minute's bar
    pub minute_lag: Duration,

    /// Backoff before re-probing the market clock after a failure
    pub clock_retry_backoff: Duration,
}

/// Application configuration, assembled once in `main` and passed down
/// explicitly. No global configuration state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum connections held by the r2d2 pool
    pub db_pool_size: u32,

    pub alpaca: AlpacaConfig,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Assemble configuration from environment variables.
    ///
    /// `DATABASE_URL`, `ALPACA_API_KEY_ID` and `ALPACA_API_SECRET_KEY` are
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            db_pool_size: parse_or("DB_POOL_MAX_SIZE", 10),
            alpaca: AlpacaConfig {
                api_key_id: require("ALPACA_API_KEY_ID")?,
                api_secret_key: require("ALPACA_API_SECRET_KEY")?,
                data_base_url: std::env::var("ALPACA_DATA_URL")
                    .unwrap_or_else(|_| DEFAULT_DATA_URL.to_string()),
                trading_base_url: std::env::var("ALPACA_TRADING_URL")
                    .unwrap_or_else(|_| DEFAULT_TRADING_URL.to_string()),
                request_timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", 30)),
            },
            scheduler: SchedulerConfig {
                max_concurrent_batches: parse_or("MAX_CONCURRENT_BATCHES", 4),
                minute_lag: Duration::from_secs(parse_or("MINUTE_LAG_SECS", 10)),
                clock_retry_backoff: Duration::from_secs(parse_or("CLOCK_RETRY_SECS", 30)),
            },
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}
