//! Long-run relation `L1 = β0 + β1·L13 + β2·trend + u`

use crate::data::TimeSeriesPanel;
use crate::error::{EcmError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use transit_math::diagnostics::{durbin_watson, shapiro_wilk};
use transit_math::regression::{design_with_constant, ols};
use transit_math::{CovarianceType, OlsFit, TestResult};

/// Fewest complete rows accepted by [`estimate_cointegration`]
pub const MIN_OBSERVATIONS: usize = 10;

/// Coefficients of the cointegrating regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CointegrationCoefficients {
    pub intercept: f64,
    pub l13: f64,
    pub trend: f64,
}

impl CointegrationCoefficients {
    /// Equilibrium L1 level implied by L13 and the trend
    pub fn long_run_l1(&self, l13: f64, trend: f64) -> f64 {
        self.intercept + self.l13 * l13 + self.trend * trend
    }

    /// Deviation of an observed L1 from equilibrium (the error-correction term)
    pub fn equilibrium_error(&self, l1: f64, l13: f64, trend: f64) -> f64 {
        l1 - self.long_run_l1(l13, trend)
    }
}

/// Estimate and inference for one regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSummary {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

impl CoefficientSummary {
    pub(crate) fn from_fit(names: &[String], fit: &OlsFit) -> Vec<Self> {
        names
            .iter()
            .enumerate()
            .map(|(j, name)| CoefficientSummary {
                name: name.clone(),
                estimate: fit.params[j],
                std_error: fit.std_errors[j],
                t_value: fit.t_values[j],
                p_value: fit.p_values[j],
            })
            .collect()
    }
}

/// Fitted cointegrating regression
#[derive(Debug, Clone, Serialize)]
pub struct CointegrationResult {
    pub coefficients: CointegrationCoefficients,
    /// `const`, `L13`, `trend`
    pub summary: Vec<CoefficientSummary>,
    /// Error-correction term, one value per estimation row
    pub residuals: Vec<f64>,
    /// Date of each residual
    pub residual_dates: Vec<NaiveDate>,
    pub fitted_values: Vec<f64>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: Option<f64>,
    pub f_pvalue: Option<f64>,
    pub durbin_watson: f64,
    /// `None` when the residual sample is outside the test's range
    pub shapiro_wilk: Option<TestResult>,
    pub aic: f64,
    pub bic: f64,
    pub log_likelihood: f64,
    pub n_observations: usize,
}

impl CointegrationResult {
    /// Residual recorded for `date`, if that row was in the estimation sample
    pub fn residual_at(&self, date: NaiveDate) -> Option<f64> {
        self.residual_dates
            .binary_search(&date)
            .ok()
            .map(|i| self.residuals[i])
    }

    pub fn residual_mean(&self) -> f64 {
        transit_math::series::mean(&self.residuals).unwrap_or(0.0)
    }
}

/// Fit the long-run regression on every row with an observed L1.
///
/// L3 is not used at this stage. Fails with a validation error when fewer
/// than [`MIN_OBSERVATIONS`] rows have L1, L13 and trend.
pub fn estimate_cointegration(panel: &TimeSeriesPanel) -> Result<CointegrationResult> {
    let mut dates = Vec::with_capacity(panel.len());
    let mut l1 = Vec::with_capacity(panel.len());
    let mut l13 = Vec::with_capacity(panel.len());
    let mut trend = Vec::with_capacity(panel.len());

    for i in 0..panel.len() {
        if let Some(value) = panel.l1()[i] {
            dates.push(panel.dates()[i]);
            l1.push(value);
            l13.push(panel.l13()[i]);
            trend.push(panel.trend()[i] as f64);
        }
    }

    if l1.len() < panel.len() {
        debug!(
            dropped = panel.len() - l1.len(),
            "Dropping rows without L1 before the cointegrating regression"
        );
    }
    if l1.len() < MIN_OBSERVATIONS {
        return Err(EcmError::ValidationError(format!(
            "Insufficient observations ({}) for the cointegrating regression, need at least {}",
            l1.len(),
            MIN_OBSERVATIONS
        )));
    }

    let design = design_with_constant(&[&l13, &trend])?;
    let fit = ols(&l1, &design, CovarianceType::NonRobust)?;

    let coefficients = CointegrationCoefficients {
        intercept: fit.params[0],
        l13: fit.params[1],
        trend: fit.params[2],
    };
    let durbin_watson = durbin_watson(&fit.residuals)?;
    let shapiro_wilk = match shapiro_wilk(&fit.residuals) {
        Ok(result) => Some(result),
        Err(err) => {
            warn!(error = %err, "Shapiro-Wilk check on cointegration residuals skipped");
            None
        }
    };

    info!(
        n = fit.nobs,
        beta0 = coefficients.intercept,
        beta1 = coefficients.l13,
        beta2 = coefficients.trend,
        r_squared = fit.r_squared,
        durbin_watson,
        "Estimated cointegrating relation"
    );

    let names = ["const", "L13", "trend"].map(String::from);

    Ok(CointegrationResult {
        coefficients,
        summary: CoefficientSummary::from_fit(&names, &fit),
        residual_dates: dates,
        fitted_values: fit.fitted_values.clone(),
        r_squared: fit.r_squared,
        adj_r_squared: fit.adj_r_squared,
        f_statistic: fit.f_statistic,
        f_pvalue: fit.f_pvalue,
        durbin_watson,
        shapiro_wilk,
        aic: fit.aic,
        bic: fit.bic,
        log_likelihood: fit.log_likelihood,
        n_observations: fit.nobs,
        residuals: fit.residuals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn panel(n: usize) -> TimeSeriesPanel {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let dates = (0..n).map(|i| start + chrono::Duration::days(7 * i as i64)).collect();
        let l13: Vec<f64> = (0..n).map(|i| 10.0 + ((i * 7) % 5) as f64 * 0.4).collect();
        let noise = [0.05, -0.03, 0.02, -0.04, 0.01, 0.0, -0.02];
        let l1 = (0..n)
            .map(|i| 1.0 + 0.9 * l13[i] + 0.02 * (i + 1) as f64 + noise[i % noise.len()])
            .collect();
        let l3 = vec![5.0; n];
        TimeSeriesPanel::aligned(dates, l1, l3, l13).unwrap()
    }

    #[test]
    fn test_recovers_coefficients() {
        let result = estimate_cointegration(&panel(40)).unwrap();
        assert_relative_eq!(result.coefficients.l13, 0.9, epsilon = 0.05);
        assert_relative_eq!(result.coefficients.trend, 0.02, epsilon = 0.005);
        assert_eq!(result.residuals.len(), 40);
        assert_eq!(result.summary[1].name, "L13");
        assert!(result.r_squared > 0.9);
        assert!(result.residual_mean().abs() < 1e-9);
    }

    #[test]
    fn test_residual_lookup_by_date() {
        let p = panel(20);
        let result = estimate_cointegration(&p).unwrap();
        let date = p.dates()[5];
        let expected = result.coefficients.equilibrium_error(
            p.l1()[5].unwrap(),
            p.l13()[5],
            p.trend()[5] as f64,
        );
        assert_relative_eq!(result.residual_at(date).unwrap(), expected, epsilon = 1e-9);
        assert!(result
            .residual_at(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap())
            .is_none());
    }

    #[test]
    fn test_rejects_short_panel() {
        let err = estimate_cointegration(&panel(9)).unwrap_err();
        assert!(matches!(err, EcmError::ValidationError(_)));
    }
}
