use crate::database::models::{DailyBar, NewSymbolDailySummary};
use crate::indicators::{bollinger, rsi, stats};

/// Number of newest daily bars a summary is computed from. Twenty trading
/// days is a month; the extra bar anchors the oldest pairwise return.
pub const REQUIRED_DAILY_BARS: usize = 21;

/// RSI look-back period
const RSI_PERIOD: usize = 14;

/// Bollinger band look-back period
const BOLLINGER_PERIOD: usize = 20;

/// Outcome of one symbol-day summary computation
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// Every metric computed over its full window
    Computed(NewSymbolDailySummary),

    /// Not enough usable history; nothing is written for this symbol-day
    InsufficientData { have: usize, need: usize },
}

/// Compute the daily indicator summary for one symbol from its newest
/// `REQUIRED_DAILY_BARS` daily bars, ordered newest first.
///
/// Every metric must compute over its full window or the whole symbol-day
/// is reported as insufficient. A partially-populated summary row is never
/// produced, and degenerate inputs (zero closes or volumes in a
/// denominator) fail the day rather than emit non-finite values.
pub fn compute_daily_summary(symbol: &str, bars_desc: &[DailyBar]) -> SummaryOutcome {
    if bars_desc.len() != REQUIRED_DAILY_BARS {
        return SummaryOutcome::InsufficientData {
            have: bars_desc.len(),
            need: REQUIRED_DAILY_BARS,
        };
    }

    let closes: Vec<f64> = bars_desc.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars_desc.iter().map(|b| b.volume as f64).collect();

    match build_summary(symbol, bars_desc, &closes, &volumes) {
        Some(summary) => SummaryOutcome::Computed(summary),
        None => SummaryOutcome::InsufficientData {
            have: bars_desc.len(),
            need: REQUIRED_DAILY_BARS,
        },
    }
}

/// `None` means a metric window was degenerate
fn build_summary(
    symbol: &str,
    bars_desc: &[DailyBar],
    closes: &[f64],
    volumes: &[f64],
) -> Option<NewSymbolDailySummary> {
    let return_1d = stats::pct_change(closes[0], closes[1])?;
    let return_5d = stats::pct_change(closes[0], closes[4])?;

    let volatility_5d = stats::sample_std_dev(&stats::daily_returns(&closes[..6], 5)?)?;
    let volatility_10d = stats::sample_std_dev(&stats::daily_returns(&closes[..11], 10)?)?;

    let sma_5 = stats::mean(&closes[..5])?;
    let sma_10 = stats::mean(&closes[..10])?;

    // RSI and Bollinger take their windows oldest first
    let mut rsi_window = closes[..RSI_PERIOD + 1].to_vec();
    rsi_window.reverse();
    let rsi_14 = rsi::wilder_rsi(&rsi_window, RSI_PERIOD)?;

    let mut bollinger_window = closes[..BOLLINGER_PERIOD].to_vec();
    bollinger_window.reverse();
    let bollinger_bandwidth = bollinger::bollinger_bandwidth(&bollinger_window, BOLLINGER_PERIOD)?;

    let volume_avg_5d = stats::mean(&volumes[..5])?;
    if volume_avg_5d == 0.0 {
        return None;
    }
    let volume_ratio = volumes[0] / volume_avg_5d;

    Some(NewSymbolDailySummary {
        symbol: symbol.to_string(),
        date: bars_desc[0].timestamp.date_naive(),
        return_1d,
        return_5d,
        volatility_5d,
        volatility_10d,
        sma_5,
        sma_10,
        rsi_14,
        bollinger_bandwidth,
        volume_avg_5d,
        volume_ratio,
    })
}
