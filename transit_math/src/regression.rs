//! Ordinary least squares with classical or HAC covariance
//!
//! The design matrix is expected to carry an intercept column; R² and the
//! F-statistic are computed around the mean of the dependent variable.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

/// Covariance estimator used for standard errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CovarianceType {
    /// Homoskedastic `σ² (X'X)⁻¹`
    #[default]
    NonRobust,
    /// Newey-West with a Bartlett kernel over `max_lags` lags
    Hac { max_lags: usize },
}

/// Information criterion used to rank competing fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InformationCriterion {
    #[serde(rename = "AIC")]
    Aic,
    #[default]
    #[serde(rename = "BIC")]
    Bic,
    /// AIC with the small-sample correction `2k(k+1) / (n - k - 1)`
    #[serde(rename = "AICc")]
    Aicc,
}

impl InformationCriterion {
    /// Evaluate the criterion for a fitted model
    pub fn value(&self, fit: &OlsFit) -> f64 {
        match self {
            InformationCriterion::Aic => fit.aic,
            InformationCriterion::Bic => fit.bic,
            InformationCriterion::Aicc => {
                let k = fit.n_params as f64;
                let denom = (fit.nobs as f64 - k - 1.0).max(1.0);
                fit.aic + (2.0 * k * (k + 1.0)) / denom
            }
        }
    }

    /// Short label, e.g. `"BIC"`
    pub fn label(&self) -> &'static str {
        match self {
            InformationCriterion::Aic => "AIC",
            InformationCriterion::Bic => "BIC",
            InformationCriterion::Aicc => "AICc",
        }
    }
}

impl std::fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of an OLS fit
#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    /// Estimated coefficients, in design column order
    pub params: Vec<f64>,
    /// Standard errors under the requested covariance
    pub std_errors: Vec<f64>,
    /// Coefficient / standard error
    pub t_values: Vec<f64>,
    /// Two-sided p-values (Student t for classical, normal for HAC)
    pub p_values: Vec<f64>,
    pub residuals: Vec<f64>,
    pub fitted_values: Vec<f64>,
    pub nobs: usize,
    /// Number of estimated coefficients, intercept included
    pub n_params: usize,
    /// Sum of squared residuals
    pub ssr: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Classical overall F-test, `None` without slope terms
    pub f_statistic: Option<f64>,
    pub f_pvalue: Option<f64>,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub covariance: CovarianceType,
}

impl OlsFit {
    /// Residual degrees of freedom
    pub fn df_resid(&self) -> usize {
        self.nobs - self.n_params
    }

    /// Linear prediction for one design row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.params.len() {
            return Err(MathError::InvalidInput(format!(
                "Design row has {} values but the model has {} coefficients",
                row.len(),
                self.params.len()
            )));
        }
        Ok(row.iter().zip(&self.params).map(|(x, b)| x * b).sum())
    }
}

/// Build an `n × (k + 1)` design matrix: a constant column followed by `columns`
pub fn design_with_constant(columns: &[&[f64]]) -> Result<DMatrix<f64>> {
    let nrows = columns.first().map(|c| c.len()).unwrap_or(0);
    if columns.iter().any(|c| c.len() != nrows) {
        return Err(MathError::InvalidInput(
            "Design columns must have equal length".to_string(),
        ));
    }

    Ok(DMatrix::from_fn(nrows, columns.len() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            columns[j - 1][i]
        }
    }))
}

/// Numerical rank from the singular values, with the usual
/// `max(sv) · max(n, k) · ε` tolerance.
pub fn matrix_rank(x: &DMatrix<f64>) -> usize {
    if x.is_empty() {
        return 0;
    }

    let svd = x.clone().svd(false, false);
    let largest = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
    let tol = largest * x.nrows().max(x.ncols()) as f64 * f64::EPSILON;

    svd.singular_values.iter().filter(|&&s| s > tol).count()
}

/// Fit `y = X β + u` by least squares
pub fn ols(y: &[f64], x: &DMatrix<f64>, covariance: CovarianceType) -> Result<OlsFit> {
    let n = x.nrows();
    let k = x.ncols();

    if y.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Response has {} rows but design has {}",
            y.len(),
            n
        )));
    }
    if k == 0 || n <= k {
        return Err(MathError::InsufficientData(format!(
            "OLS needs more observations ({}) than coefficients ({})",
            n, k
        )));
    }
    if y.iter().chain(x.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Regression input contains non-finite values".to_string(),
        ));
    }

    let rank = matrix_rank(x);
    if rank < k {
        return Err(MathError::SingularMatrix { rank, columns: k });
    }

    let xt = x.transpose();
    let xtx_inv = (&xt * x).try_inverse().ok_or_else(|| {
        MathError::CalculationError("X'X could not be inverted".to_string())
    })?;

    let y_vec = DVector::from_column_slice(y);
    let beta = &xtx_inv * (&xt * &y_vec);
    let fitted = x * &beta;
    let resid = &y_vec - &fitted;

    let nobs = n as f64;
    let df_resid = (n - k) as f64;
    let ssr = resid.dot(&resid);
    let y_mean = y_vec.mean();
    let centered_tss: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();

    let r_squared = if centered_tss > 0.0 {
        1.0 - ssr / centered_tss
    } else {
        f64::NAN
    };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (nobs - 1.0) / df_resid;

    let cov = match covariance {
        CovarianceType::NonRobust => &xtx_inv * (ssr / df_resid),
        CovarianceType::Hac { max_lags } => hac_covariance(x, &resid, &xtx_inv, max_lags),
    };

    let params: Vec<f64> = beta.iter().copied().collect();
    let std_errors: Vec<f64> = (0..k).map(|j| cov[(j, j)].max(0.0).sqrt()).collect();
    let t_values: Vec<f64> = params
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| if *se > 0.0 { b / se } else { f64::NAN })
        .collect();

    let p_values = match covariance {
        CovarianceType::NonRobust => {
            let dist = StudentsT::new(0.0, 1.0, df_resid)?;
            t_values
                .iter()
                .map(|t| two_sided(t, |z| dist.cdf(z)))
                .collect()
        }
        CovarianceType::Hac { .. } => {
            let dist = Normal::new(0.0, 1.0)?;
            t_values
                .iter()
                .map(|t| two_sided(t, |z| dist.cdf(z)))
                .collect()
        }
    };

    let df_model = (k - 1) as f64;
    let (f_statistic, f_pvalue) = if k > 1 && r_squared.is_finite() && r_squared < 1.0 {
        let f = (r_squared / df_model) / ((1.0 - r_squared) / df_resid);
        let dist = FisherSnedecor::new(df_model, df_resid)?;
        (Some(f), Some(1.0 - dist.cdf(f)))
    } else {
        (None, None)
    };

    let log_likelihood =
        -nobs / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nobs).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;
    let bic = -2.0 * log_likelihood + k as f64 * nobs.ln();

    Ok(OlsFit {
        params,
        std_errors,
        t_values,
        p_values,
        residuals: resid.iter().copied().collect(),
        fitted_values: fitted.iter().copied().collect(),
        nobs: n,
        n_params: k,
        ssr,
        r_squared,
        adj_r_squared,
        f_statistic,
        f_pvalue,
        log_likelihood,
        aic,
        bic,
        covariance,
    })
}

fn two_sided(t: &f64, cdf: impl Fn(f64) -> f64) -> f64 {
    if t.is_finite() {
        2.0 * (1.0 - cdf(t.abs()))
    } else {
        f64::NAN
    }
}

/// Newey-West sandwich `(X'X)⁻¹ S (X'X)⁻¹` with Bartlett weights
/// `1 - l / (L + 1)` and no small-sample correction.
fn hac_covariance(
    x: &DMatrix<f64>,
    resid: &DVector<f64>,
    xtx_inv: &DMatrix<f64>,
    max_lags: usize,
) -> DMatrix<f64> {
    let n = x.nrows();

    let mut scores = x.clone();
    for (t, e) in resid.iter().enumerate() {
        scores.row_mut(t).scale_mut(*e);
    }

    let mut s = scores.transpose() * &scores;
    for lag in 1..=max_lags.min(n.saturating_sub(1)) {
        let weight = 1.0 - lag as f64 / (max_lags as f64 + 1.0);
        let gamma = scores.rows(lag, n - lag).transpose() * scores.rows(0, n - lag);
        s += (&gamma + gamma.transpose()) * weight;
    }

    xtx_inv * s * xtx_inv
}
