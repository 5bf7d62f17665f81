use crate::indicators::stats;

/// Bollinger band width relative to the period moving average.
///
/// `closes_asc` is ordered oldest to newest; the last `period` closes form
/// the window. Bands sit two sample standard deviations either side of the
/// SMA and the width is `(upper - lower) / sma`. A zero-variance window
/// yields 0.0; a zero SMA cannot be normalized against and fails.
pub fn bollinger_bandwidth(closes_asc: &[f64], period: usize) -> Option<f64> {
    if closes_asc.len() < period {
        return None;
    }

    let window = &closes_asc[closes_asc.len() - period..];

    let sma = stats::mean(window)?;
    if sma == 0.0 {
        return None;
    }
    let std_dev = stats::sample_std_dev(window)?;

    let upper = sma + 2.0 * std_dev;
    let lower = sma - 2.0 * std_dev;

    Some((upper - lower) / sma)
}
