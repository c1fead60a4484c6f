//! Series helpers shared by the estimators

use crate::{MathError, Result};

/// First differences: `out[i] = values[i + 1] - values[i]`
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Standard deviation needs at least 2 values, have {}",
            values.len()
        )));
    }

    let m = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Ok(variance.sqrt())
}

/// Pearson correlation of two equally long slices. `None` when undefined.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(cov / denom)
}

/// Lag-k autocorrelation computed as the correlation between the series
/// and its own k-shifted copy over the overlapping part.
pub fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || values.len() <= lag {
        return None;
    }
    pearson(&values[lag..], &values[..values.len() - lag])
}

/// Automatic Newey-West lag window: `max(1, min(8, floor(4 (T/100)^(2/9))))`
pub fn newey_west_lags(nobs: usize) -> usize {
    let raw = (4.0 * (nobs as f64 / 100.0).powf(2.0 / 9.0)).floor() as usize;
    raw.clamp(1, 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diff_and_mean() {
        let values = vec![1.0, 4.0, 9.0, 16.0];
        assert_eq!(diff(&values), vec![3.0, 5.0, 7.0]);
        assert_eq!(mean(&values), Some(7.5));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(std_dev(&values).unwrap(), 2.138089935, epsilon = 1e-8);
        assert!(std_dev(&[1.0]).is_err());
    }

    #[test]
    fn test_autocorrelation_of_alternating_series() {
        let values = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        assert_relative_eq!(autocorrelation(&values, 1).unwrap(), -1.0, epsilon = 1e-12);
        assert!(autocorrelation(&[1.0, 1.0, 1.0], 1).is_none());
    }

    #[test]
    fn test_newey_west_lags() {
        assert_eq!(newey_west_lags(1), 1);
        assert_eq!(newey_west_lags(5), 2);
        assert_eq!(newey_west_lags(100), 4);
        assert_eq!(newey_west_lags(199), 4);
        assert_eq!(newey_west_lags(1_000_000), 8);
    }
}
