//! Trailing-window statistics over a date-ascending series.

/// Mean of the last `window` values; `None` when fewer are available.
pub fn simple_moving_average(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Day-over-day fractional changes: `x[i] / x[i-1] - 1`.
///
/// A zero previous value yields a non-finite change, left for callers to reject.
pub fn pct_changes(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

/// Sample standard deviation (n - 1) of the last `window` percentage changes.
///
/// Needs `window + 1` values. Returns `None` when short of data or when any
/// change inside the window is non-finite.
pub fn pct_change_volatility(values: &[f64], window: usize) -> Option<f64> {
    if window < 2 || values.len() < window + 1 {
        return None;
    }
    let tail = &values[values.len() - (window + 1)..];
    let changes = pct_changes(tail);
    if changes.iter().any(|change| !change.is_finite()) {
        return None;
    }
    sample_std(&changes)
}

/// Short-over-long moving average ratio.
///
/// A non-positive long average has no meaningful ratio, so the trend is
/// reported as neutral (exactly 1).
pub fn trend_indicator(short_ma: f64, long_ma: f64) -> f64 {
    if long_ma > 0.0 {
        short_ma / long_ma
    } else {
        1.0
    }
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    Some(variance.sqrt())
}
