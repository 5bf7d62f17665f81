/// Wilder-smoothed relative strength index over the last `period` changes.
///
/// `closes_asc` is ordered oldest to newest and needs at least `period + 1`
/// values. Averages are seeded with the simple mean of the first `period`
/// gains and losses, then Wilder smoothing
/// `avg = (avg * (period - 1) + new) / period` absorbs the remainder.
/// An average loss of exactly zero defines RSI as 100.
pub fn wilder_rsi(closes_asc: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes_asc.len() < period + 1 {
        return None;
    }

    let changes: Vec<f64> = closes_asc.windows(2).map(|w| w[1] - w[0]).collect();
    let period_f = period as f64;

    let mut avg_gain = changes[..period]
        .iter()
        .map(|c| if *c > 0.0 { *c } else { 0.0 })
        .sum::<f64>()
        / period_f;
    let mut avg_loss = changes[..period]
        .iter()
        .map(|c| if *c < 0.0 { c.abs() } else { 0.0 })
        .sum::<f64>()
        / period_f;

    // Smooth in whatever extends past the seed window
    for change in &changes[period..] {
        let gain = if *change > 0.0 { *change } else { 0.0 };
        let loss = if *change < 0.0 { change.abs() } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
