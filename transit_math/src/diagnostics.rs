//! Residual diagnostics
//!
//! Serial correlation, heteroskedasticity and normality tests used to
//! describe a fitted regression. Every test returns its statistic together
//! with an upper-tail p-value.

use crate::regression::{ols, CovarianceType};
use crate::{MathError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Test statistic with its p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Ljung-Box portmanteau test at a single lag window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjungBox {
    pub lags: usize,
    pub statistic: f64,
    pub p_value: f64,
}

/// Jarque-Bera normality test with the moments it is built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JarqueBera {
    pub statistic: f64,
    pub p_value: f64,
    pub skewness: f64,
    /// Non-excess kurtosis (3 for a normal sample)
    pub kurtosis: f64,
}

/// Ljung-Box lag window for `nobs` residuals: `max(1, min(floor(√T), 12, T - 2))`.
///
/// Returns `None` when there are 5 residuals or fewer.
pub fn ljung_box_lags(nobs: usize) -> Option<usize> {
    if nobs <= 5 {
        return None;
    }
    let root = (nobs as f64).sqrt().floor() as usize;
    Some(root.min(12).min(nobs - 2).max(1))
}

/// Ljung-Box Q statistic over lags `1..=lags`
pub fn ljung_box(residuals: &[f64], lags: usize) -> Result<LjungBox> {
    let n = residuals.len();
    if lags == 0 || lags >= n {
        return Err(MathError::InvalidInput(format!(
            "Ljung-Box lag window {} is invalid for {} residuals",
            lags, n
        )));
    }

    let nf = n as f64;
    let mean = residuals.iter().sum::<f64>() / nf;
    let centered: Vec<f64> = residuals.iter().map(|e| e - mean).collect();
    let denom: f64 = centered.iter().map(|e| e * e).sum();
    if denom <= 0.0 {
        return Err(MathError::CalculationError(
            "Ljung-Box needs residuals with non-zero variance".to_string(),
        ));
    }

    let mut q = 0.0;
    for k in 1..=lags {
        let acov: f64 = centered[k..]
            .iter()
            .zip(&centered[..n - k])
            .map(|(a, b)| a * b)
            .sum();
        let rho = acov / denom;
        q += rho * rho / (nf - k as f64);
    }
    let statistic = nf * (nf + 2.0) * q;

    let chi2 = ChiSquared::new(lags as f64)?;
    Ok(LjungBox {
        lags,
        statistic,
        p_value: 1.0 - chi2.cdf(statistic),
    })
}

/// Breusch-Pagan test in the studentized (Koenker) form.
///
/// Regresses the squared residuals on `design` (which must contain the
/// intercept) and reports `LM = n · R²` against χ² with `k - 1` degrees
/// of freedom.
pub fn breusch_pagan(residuals: &[f64], design: &DMatrix<f64>) -> Result<TestResult> {
    let k = design.ncols();
    if k < 2 {
        return Err(MathError::InvalidInput(
            "Breusch-Pagan needs at least one regressor besides the constant".to_string(),
        ));
    }

    let squared: Vec<f64> = residuals.iter().map(|e| e * e).collect();
    let aux = ols(&squared, design, CovarianceType::NonRobust)?;
    let r_squared = if aux.r_squared.is_finite() {
        aux.r_squared
    } else {
        0.0
    };
    let statistic = aux.nobs as f64 * r_squared;

    let chi2 = ChiSquared::new((k - 1) as f64)?;
    Ok(TestResult {
        statistic,
        p_value: 1.0 - chi2.cdf(statistic),
    })
}

/// Jarque-Bera test from the biased sample skewness and kurtosis
pub fn jarque_bera(residuals: &[f64]) -> Result<JarqueBera> {
    let n = residuals.len();
    if n < 2 {
        return Err(MathError::InsufficientData(format!(
            "Jarque-Bera needs at least 2 values, have {}",
            n
        )));
    }

    let nf = n as f64;
    let mean = residuals.iter().sum::<f64>() / nf;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for e in residuals {
        let d = e - mean;
        m2 += d * d;
        m3 += d * d * d;
        m4 += d * d * d * d;
    }
    m2 /= nf;
    m3 /= nf;
    m4 /= nf;

    if m2 <= 0.0 {
        return Err(MathError::CalculationError(
            "Jarque-Bera needs values with non-zero variance".to_string(),
        ));
    }

    let skewness = m3 / m2.powf(1.5);
    let kurtosis = m4 / (m2 * m2);
    let statistic = nf / 6.0 * (skewness.powi(2) + (kurtosis - 3.0).powi(2) / 4.0);

    let chi2 = ChiSquared::new(2.0)?;
    Ok(JarqueBera {
        statistic,
        p_value: 1.0 - chi2.cdf(statistic),
        skewness,
        kurtosis,
    })
}

/// Durbin-Watson statistic, `Σ(eₜ - eₜ₋₁)² / Σeₜ²`
pub fn durbin_watson(residuals: &[f64]) -> Result<f64> {
    if residuals.len() < 2 {
        return Err(MathError::InsufficientData(
            "Durbin-Watson needs at least 2 residuals".to_string(),
        ));
    }

    let ss: f64 = residuals.iter().map(|e| e * e).sum();
    if ss <= 0.0 {
        return Err(MathError::CalculationError(
            "Durbin-Watson is undefined for all-zero residuals".to_string(),
        ));
    }
    let diff_ss: f64 = residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();

    Ok(diff_ss / ss)
}

const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk W test (Royston's AS R94 approximation, 3 ≤ n ≤ 5000)
pub fn shapiro_wilk(values: &[f64]) -> Result<TestResult> {
    let n = values.len();
    if n < 3 {
        return Err(MathError::InsufficientData(format!(
            "Shapiro-Wilk needs at least 3 values, have {}",
            n
        )));
    }
    if n > 5000 {
        return Err(MathError::InvalidInput(format!(
            "Shapiro-Wilk approximation is valid up to 5000 values, have {}",
            n
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Shapiro-Wilk input contains non-finite values".to_string(),
        ));
    }

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    if x[n - 1] - x[0] < 1e-19 {
        return Err(MathError::CalculationError(
            "Shapiro-Wilk is undefined for a constant sample".to_string(),
        ));
    }

    let weights = shapiro_wilk_weights(n)?;
    let an = n as f64;
    let mean = x.iter().sum::<f64>() / an;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator: f64 = weights
        .iter()
        .enumerate()
        .map(|(i, a)| a * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ss).min(1.0);

    if n == 3 {
        let p = (6.0 / std::f64::consts::PI) * (w.sqrt().asin() - 1.047_197_551_196_6);
        return Ok(TestResult {
            statistic: w,
            p_value: p.max(0.0),
        });
    }

    let w1 = (1.0 - w).ln();
    let (y, m, s) = if n <= 11 {
        let gamma = poly(&SW_G, an);
        if w1 >= gamma {
            return Ok(TestResult {
                statistic: w,
                p_value: 1e-99,
            });
        }
        (-(gamma - w1).ln(), poly(&SW_C3, an), poly(&SW_C4, an).exp())
    } else {
        let ln_n = an.ln();
        (w1, poly(&SW_C5, ln_n), poly(&SW_C6, ln_n).exp())
    };

    let normal = Normal::new(m, s)?;
    Ok(TestResult {
        statistic: w,
        p_value: 1.0 - normal.cdf(y),
    })
}

/// Half of the antisymmetric coefficient vector, largest first
fn shapiro_wilk_weights(n: usize) -> Result<Vec<f64>> {
    let half = n / 2;
    if n == 3 {
        return Ok(vec![std::f64::consts::FRAC_1_SQRT_2]);
    }

    let standard = Normal::new(0.0, 1.0)?;
    let an = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| standard.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();

    let a1 = poly(&SW_C1, rsn) - m[0] / ssumm2;
    let mut weights = vec![0.0; half];
    weights[0] = a1;

    let (first_rest, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&SW_C2, rsn);
        weights[1] = a2;
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };

    for i in first_rest..half {
        weights[i] = -m[i] / fac;
    }

    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::design_with_constant;
    use approx::assert_relative_eq;

    #[test]
    fn test_ljung_box_alternating_series() {
        let resid = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let lb = ljung_box(&resid, 1).unwrap();
        assert_relative_eq!(lb.statistic, 20.0 / 3.0, epsilon = 1e-12);
        assert!(lb.p_value < 0.01);
        assert!(ljung_box(&resid, 6).is_err());
    }

    #[test]
    fn test_ljung_box_lag_window() {
        assert_eq!(ljung_box_lags(5), None);
        assert_eq!(ljung_box_lags(6), Some(2));
        assert_eq!(ljung_box_lags(50), Some(7));
        assert_eq!(ljung_box_lags(400), Some(12));
    }

    #[test]
    fn test_jarque_bera_symmetric_sample() {
        let jb = jarque_bera(&[-2.0, -1.0, 0.0, 1.0, 2.0]).unwrap();
        assert_relative_eq!(jb.skewness, 0.0, epsilon = 1e-12);
        assert_relative_eq!(jb.kurtosis, 1.7, epsilon = 1e-12);
        assert_relative_eq!(jb.statistic, 5.0 / 6.0 * 1.69 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_durbin_watson() {
        assert_relative_eq!(durbin_watson(&[1.0, -1.0, 1.0, -1.0]).unwrap(), 3.0);
        assert_relative_eq!(durbin_watson(&[1.0, 1.0, 1.0, 1.0]).unwrap(), 0.0);
        assert!(durbin_watson(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_breusch_pagan_detects_growing_variance() {
        let x: Vec<f64> = (1..=40).map(|i| i as f64).collect();
        let resid: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| if i % 2 == 0 { 0.1 * v } else { -0.1 * v })
            .collect();
        let design = design_with_constant(&[&x]).unwrap();

        let bp = breusch_pagan(&resid, &design).unwrap();
        assert!(bp.statistic > 20.0);
        assert!(bp.p_value < 0.001);
    }

    #[test]
    fn test_shapiro_wilk_three_points() {
        let sw = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(sw.statistic, 1.0, epsilon = 1e-9);
        assert_relative_eq!(sw.p_value, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shapiro_wilk_separates_normal_from_skewed() {
        let standard = Normal::new(0.0, 1.0).unwrap();
        let normal_like: Vec<f64> = (1..=30)
            .map(|i| standard.inverse_cdf((i as f64 - 0.5) / 30.0))
            .collect();
        let sw = shapiro_wilk(&normal_like).unwrap();
        assert!(sw.statistic > 0.97);
        assert!(sw.p_value > 0.5);

        let skewed: Vec<f64> = (0..20).map(|i| 2f64.powi(i)).collect();
        let sw = shapiro_wilk(&skewed).unwrap();
        assert!(sw.p_value < 0.001);
    }

    #[test]
    fn test_shapiro_wilk_rejects_bad_input() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_err());
        assert!(shapiro_wilk(&[4.0, 4.0, 4.0, 4.0]).is_err());
    }
}
