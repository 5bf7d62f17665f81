use crate::alpaca::ApiBar;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Minute bar entity - one OHLCV bar per symbol per minute
///
/// Identity is the composite (symbol, timestamp). Re-ingesting an existing
/// bar hits the unique constraint and is skipped, never overwritten.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::minute_bars)]
#[diesel(primary_key(id))]
pub struct MinuteBar {
    /// Auto-incrementing ID
    pub id: i64,

    /// Ticker symbol
    pub symbol: String,

    /// Start of the bar window
    pub timestamp: DateTime<Utc>,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    /// Share volume
    pub volume: i64,

    /// Number of trades in the bar
    pub trade_count: i64,

    /// Volume-weighted average price
    pub vw: f64,
}

/// New minute bar for batch insertion
#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::minute_bars)]
pub struct NewMinuteBar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub trade_count: i64,
    pub vw: f64,
}

impl NewMinuteBar {
    /// Build an insert row from a wire bar
    pub fn from_api(symbol: String, bar: &ApiBar) -> Self {
        Self {
            symbol,
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            trade_count: bar.trade_count,
            vw: bar.vwap,
        }
    }
}

/// Daily bar entity - one OHLCV bar per symbol per trading day
///
/// Same shape and identity rule as minute bars; the indicator engine reads
/// these newest-first.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::daily_bars)]
#[diesel(primary_key(id))]
pub struct DailyBar {
    /// Auto-incrementing ID
    pub id: i64,

    /// Ticker symbol
    pub symbol: String,

    /// Start of the trading day the bar covers
    pub timestamp: DateTime<Utc>,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    /// Share volume
    pub volume: i64,

    /// Number of trades in the bar
    pub trade_count: i64,

    /// Volume-weighted average price
    pub vw: f64,
}

/// New daily bar for batch insertion
#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::daily_bars)]
pub struct NewDailyBar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub trade_count: i64,
    pub vw: f64,
}

impl NewDailyBar {
    /// Build an insert row from a wire bar
    pub fn from_api(symbol: String, bar: &ApiBar) -> Self {
        Self {
            symbol,
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            trade_count: bar.trade_count,
            vw: bar.vwap,
        }
    }
}
