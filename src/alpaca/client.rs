use crate::alpaca::models::{ApiBar, HistoricalBarsResponse, LatestBarsResponse, MarketStatus};
use crate::config::AlpacaConfig;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;

/// Data feed the loader subscribes to
const FEED: &str = "iex";

/// Quote currency requested for every bar
const CURRENCY: &str = "USD";

/// Page size for the daily-bars window; one day never exceeds one page
const PAGE_LIMIT: u32 = 5000;

/// Errors raised by the market data client
#[derive(Debug, Error)]
pub enum AlpacaError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid API credential header: {0}")]
    InvalidCredentials(#[from] reqwest::header::InvalidHeaderValue),
}

/// Read-only view of the Alpaca market data and trading APIs.
///
/// The jobs and the scheduler depend on this trait, not on the concrete
/// client, so they can be exercised against in-memory fakes.
#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    /// Current market clock from the trading API
    async fn market_status(&self) -> Result<MarketStatus, AlpacaError>;

    /// Latest minute bar per symbol. `symbols` is one comma-joined batch.
    async fn latest_minute_bars(
        &self,
        symbols: &str,
    ) -> Result<HashMap<String, ApiBar>, AlpacaError>;

    /// Today's daily bars per symbol. `symbols` is one comma-joined batch.
    async fn daily_bars_today(
        &self,
        symbols: &str,
    ) -> Result<HashMap<String, Vec<ApiBar>>, AlpacaError>;

    /// Length of the minute-bars request target before the symbol list
    fn minute_request_overhead(&self) -> usize;

    /// Length of the daily-bars request target before the symbol list
    fn daily_request_overhead(&self) -> usize;
}

/// Concrete client for the Alpaca v2 REST APIs
pub struct AlpacaClient {
    client: reqwest::Client,
    data_base_url: String,
    trading_base_url: String,
}

impl AlpacaClient {
    /// Build a client with auth headers and a hard request timeout.
    /// One reqwest client is shared by every batch request.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "APCA-API-KEY-ID",
            HeaderValue::from_str(&config.api_key_id)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            HeaderValue::from_str(&config.api_secret_key)?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            data_base_url: config.data_base_url.trim_end_matches('/').to_string(),
            trading_base_url: config.trading_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request target for the latest-bars endpoint, up to and including
    /// `symbols=`. The batcher measures this to size its batches.
    fn latest_bars_target(&self) -> String {
        format!(
            "{}/v2/stocks/bars/latest?feed={FEED}&currency={CURRENCY}&symbols=",
            self.data_base_url
        )
    }

    /// Request target for today's daily-bars window, up to and including
    /// `symbols=`. The window is the current UTC date.
    fn daily_bars_target(&self) -> String {
        let today = Utc::now().format("%Y-%m-%d");
        format!(
            "{}/v2/stocks/bars?timeframe=1D&start={today}&end={today}&limit={PAGE_LIMIT}\
             &adjustment=raw&feed={FEED}&currency={CURRENCY}&sort=asc&symbols=",
            self.data_base_url
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AlpacaError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AlpacaError::Status { status, body });
        }

        Ok(resp.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl MarketData for AlpacaClient {
    async fn market_status(&self) -> Result<MarketStatus, AlpacaError> {
        let url = format!("{}/v2/clock", self.trading_base_url);
        self.get_json(&url).await
    }

    async fn latest_minute_bars(
        &self,
        symbols: &str,
    ) -> Result<HashMap<String, ApiBar>, AlpacaError> {
        let url = format!("{}{}", self.latest_bars_target(), symbols);
        let resp: LatestBarsResponse = self.get_json(&url).await?;

        tracing::debug!("Fetched {} latest minute bars", resp.bars.len());

        Ok(resp.bars)
    }

    async fn daily_bars_today(
        &self,
        symbols: &str,
    ) -> Result<HashMap<String, Vec<ApiBar>>, AlpacaError> {
        let url = format!("{}{}", self.daily_bars_target(), symbols);
        let resp: HistoricalBarsResponse = self.get_json(&url).await?;

        if resp.next_page_token.is_some() {
            // A single-day window under the page limit should never paginate
            tracing::warn!("Daily bars response carried a pagination token; ignoring it");
        }

        Ok(resp.bars)
    }

    fn minute_request_overhead(&self) -> usize {
        self.latest_bars_target().len()
    }

    fn daily_request_overhead(&self) -> usize {
        self.daily_bars_target().len()
    }
}
