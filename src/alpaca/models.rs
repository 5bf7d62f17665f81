use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Single OHLCV bar as returned by the Alpaca market data API.
///
/// Wire field names are single letters; serde renames map them onto
/// readable names. The same shape is used for minute and daily bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiBar {
    /// Bar timestamp (RFC 3339, start of the bar window)
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,

    /// Opening price
    #[serde(rename = "o")]
    pub open: f64,

    /// Highest price
    #[serde(rename = "h")]
    pub high: f64,

    /// Lowest price
    #[serde(rename = "l")]
    pub low: f64,

    /// Closing price
    #[serde(rename = "c")]
    pub close: f64,

    /// Share volume
    #[serde(rename = "v")]
    pub volume: i64,

    /// Number of trades in the bar
    #[serde(rename = "n")]
    pub trade_count: i64,

    /// Volume-weighted average price
    #[serde(rename = "vw")]
    pub vwap: f64,
}

/// Response of `/v2/stocks/bars/latest`: one bar per symbol
#[derive(Debug, Clone, Deserialize)]
pub struct LatestBarsResponse {
    pub bars: HashMap<String, ApiBar>,
}

/// Response of `/v2/stocks/bars`: a list of bars per symbol
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalBarsResponse {
    pub bars: HashMap<String, Vec<ApiBar>>,

    /// Continuation token. The daily window never exceeds one page,
    /// so this is parsed but not followed.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Market clock snapshot from the trading API `/v2/clock`.
///
/// Consulted once per scheduling tick and never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketStatus {
    /// Server-side time of the snapshot
    pub timestamp: DateTime<Utc>,

    /// Whether the market is currently open for trading
    pub is_open: bool,

    /// Start of the next regular session
    pub next_open: DateTime<Utc>,

    /// End of the current or next regular session
    pub next_close: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LATEST_BARS_FIXTURE: &str = r#"{
        "bars": {
            "AAPL": {
                "c": 228.02, "h": 228.34, "l": 227.95, "n": 416,
                "o": 228.16, "t": "2024-11-01T19:59:00Z", "v": 31688,
                "vw": 228.119551
            },
            "MSFT": {
                "c": 410.37, "h": 410.37, "l": 410.0, "n": 102,
                "o": 410.0, "t": "2024-11-01T19:59:00Z", "v": 4981,
                "vw": 410.22815
            }
        }
    }"#;

    const DAILY_BARS_FIXTURE: &str = r#"{
        "bars": {
            "AAPL": [
                {
                    "c": 222.91, "h": 225.35, "l": 220.27, "n": 9187,
                    "o": 220.97, "t": "2024-11-01T04:00:00Z", "v": 571971,
                    "vw": 223.349305
                }
            ]
        },
        "next_page_token": null
    }"#;

    const CLOCK_FIXTURE: &str = r#"{
        "timestamp": "2024-11-01T10:12:30.456-04:00",
        "is_open": false,
        "next_open": "2024-11-04T09:30:00-05:00",
        "next_close": "2024-11-04T16:00:00-05:00"
    }"#;

    #[test]
    fn test_parse_latest_bars() {
        let resp: LatestBarsResponse = serde_json::from_str(LATEST_BARS_FIXTURE).unwrap();

        assert_eq!(resp.bars.len(), 2);
        let aapl = &resp.bars["AAPL"];
        assert_eq!(aapl.close, 228.02);
        assert_eq!(aapl.volume, 31688);
        assert_eq!(aapl.trade_count, 416);
        assert_eq!(aapl.vwap, 228.119551);
        assert_eq!(
            aapl.timestamp,
            Utc.with_ymd_and_hms(2024, 11, 1, 19, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_daily_bars() {
        let resp: HistoricalBarsResponse = serde_json::from_str(DAILY_BARS_FIXTURE).unwrap();

        assert!(resp.next_page_token.is_none());
        assert_eq!(resp.bars["AAPL"].len(), 1);
        assert_eq!(resp.bars["AAPL"][0].open, 220.97);
    }

    #[test]
    fn test_parse_clock_converts_offset_to_utc() {
        let clock: MarketStatus = serde_json::from_str(CLOCK_FIXTURE).unwrap();

        assert!(!clock.is_open);
        // 09:30 Eastern is 14:30 UTC
        assert_eq!(
            clock.next_open,
            Utc.with_ymd_and_hms(2024, 11, 4, 14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_empty_bars_map_parses() {
        let resp: LatestBarsResponse = serde_json::from_str(r#"{"bars":{}}"#).unwrap();
        assert!(resp.bars.is_empty());
    }

    #[test]
    fn test_error_body_is_a_parse_error_not_a_panic() {
        let result: Result<LatestBarsResponse, _> =
            serde_json::from_str(r#"{"message":"forbidden."}"#);
        assert!(result.is_err());
    }
}
