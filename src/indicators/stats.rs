/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divisor N-1). `None` for fewer than two
/// samples, where the estimator is undefined.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let sum: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();

    Some((sum / (values.len() - 1) as f64).sqrt())
}

/// Median of a sample set. Even counts average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentage change from `old` to `new`. `None` when `old` is zero and
/// the change is undefined.
pub fn pct_change(new: f64, old: f64) -> Option<f64> {
    if old == 0.0 {
        return None;
    }

    Some((new - old) / old)
}

/// Pairwise daily percentage returns over the newest `days` day pairs.
///
/// `closes_desc` is ordered newest first and must hold exactly `days + 1`
/// closes; the extra close anchors the oldest return. A zero denominator
/// anywhere fails the whole series.
pub fn daily_returns(closes_desc: &[f64], days: usize) -> Option<Vec<f64>> {
    if closes_desc.len() != days + 1 {
        return None;
    }

    let mut returns = Vec::with_capacity(days);
    for i in 0..days {
        returns.push(pct_change(closes_desc[i], closes_desc[i + 1])?);
    }

    Some(returns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_slice_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn test_sample_std_dev_matches_known_value() {
        let values = [10.0, 12.0, 23.0, 23.0, 16.0, 23.0, 21.0, 16.0];
        assert_eq!(sample_std_dev(&values), Some(5.2372293656638167));
    }

    #[test]
    fn test_sample_std_dev_needs_two_samples() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[42.0]), None);
    }

    #[test]
    fn test_sample_std_dev_of_constant_series_is_zero() {
        assert_eq!(sample_std_dev(&[7.0, 7.0, 7.0, 7.0]), Some(0.0));
    }

    #[test]
    fn test_median_odd_count_takes_the_middle() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn test_median_even_count_averages_the_middle_pair() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_of_empty_slice_is_none() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_pct_change_zero_base_is_undefined() {
        assert_eq!(pct_change(10.0, 0.0), None);
        assert_eq!(pct_change(10.0, 8.0), Some(0.25));
    }

    #[test]
    fn test_daily_returns_newest_first_pairs() {
        // Newest first: 110 yesterday closed 100, the day before 80
        let closes = [110.0, 100.0, 80.0];
        let returns = daily_returns(&closes, 2).unwrap();

        assert_eq!(returns, vec![0.1, 0.25]);
    }

    #[test]
    fn test_daily_returns_requires_exactly_one_extra_close() {
        assert_eq!(daily_returns(&[1.0, 2.0, 3.0], 5), None);
        assert_eq!(daily_returns(&[1.0, 2.0, 3.0], 1), None);
    }

    #[test]
    fn test_daily_returns_zero_denominator_fails_the_series() {
        assert_eq!(daily_returns(&[10.0, 0.0, 5.0], 2), None);
    }
}
