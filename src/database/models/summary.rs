use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Daily indicator summary entity - one row per symbol per trading day
///
/// A row only exists when every metric could be computed over its full
/// window; there are no partially-populated summaries.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::symbol_daily_summaries)]
#[diesel(primary_key(id))]
pub struct SymbolDailySummary {
    /// Auto-incrementing ID
    pub id: i64,

    /// Ticker symbol
    pub symbol: String,

    /// Date of the newest daily bar the summary was computed from
    pub date: NaiveDate,

    /// One-day percentage return
    pub return_1d: f64,

    /// Five-day percentage return
    pub return_5d: f64,

    /// Sample standard deviation of daily returns over five days
    pub volatility_5d: f64,

    /// Sample standard deviation of daily returns over ten days
    pub volatility_10d: f64,

    /// Simple moving average of the last five closes
    pub sma_5: f64,

    /// Simple moving average of the last ten closes
    pub sma_10: f64,

    /// Wilder-smoothed 14-period relative strength index
    pub rsi_14: f64,

    /// Bollinger band width relative to the 20-day moving average
    pub bollinger_bandwidth: f64,

    /// Average share volume over the last five days
    pub volume_avg_5d: f64,

    /// Latest volume relative to its five-day average
    pub volume_ratio: f64,
}

/// New summary row for batch insertion
#[derive(Debug, Clone, PartialEq, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::symbol_daily_summaries)]
pub struct NewSymbolDailySummary {
    pub symbol: String,
    pub date: NaiveDate,
    pub return_1d: f64,
    pub return_5d: f64,
    pub volatility_5d: f64,
    pub volatility_10d: f64,
    pub sma_5: f64,
    pub sma_10: f64,
    pub rsi_14: f64,
    pub bollinger_bandwidth: f64,
    pub volume_avg_5d: f64,
    pub volume_ratio: f64,
}
