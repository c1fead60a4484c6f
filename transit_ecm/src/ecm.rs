//! Short-run error correction model with information-criterion lag search
//!
//! The estimated equation is
//!
//! ```text
//! ΔL1_t = α + Σ_{i=1..p} φ_i ΔL1_{t-i} + Σ_{j=s..q} θ_j ΔL13_{t-j}
//!           + Σ_{m=s..r} ψ_m ΔL3_{t-m} + γ u_{t-1} + ε_t
//! ```
//!
//! where `s` is 0 when contemporaneous terms are allowed and 1 otherwise,
//! and `u` is the cointegration residual.

use crate::cointegration::{CoefficientSummary, CointegrationCoefficients, CointegrationResult};
use crate::config::EcmOptions;
use crate::data::{LevelSeries, TimeSeriesPanel};
use crate::error::{EcmError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use transit_math::diagnostics::{
    breusch_pagan, jarque_bera, ljung_box, ljung_box_lags, JarqueBera, LjungBox, TestResult,
};
use transit_math::regression::{matrix_rank, ols};
use transit_math::series::{diff, newey_west_lags, std_dev};
use transit_math::{CovarianceType, InformationCriterion, MathError};

/// Fewest usable rows for a grid candidate
pub const MIN_SEARCH_ROWS: usize = 10;

/// Standard deviation below which a differenced series is considered constant
pub const MIN_DIFF_STD: f64 = 1e-8;

/// Significance level for the error-correction coefficient
pub const GAMMA_SIGNIFICANCE: f64 = 0.05;

/// Selected lag orders. `None` excludes the term entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcmSpecification {
    /// Own lags of ΔL1
    pub p: usize,
    /// Highest ΔL13 lag
    pub q: Option<usize>,
    /// Highest ΔL3 lag
    pub r: Option<usize>,
    /// Exogenous lags start at 0 instead of 1
    pub allow_contemporaneous: bool,
}

impl EcmSpecification {
    pub fn new(p: usize, q: Option<usize>, r: Option<usize>, allow_contemporaneous: bool) -> Self {
        Self {
            p,
            q,
            r,
            allow_contemporaneous,
        }
    }

    /// First exogenous lag
    pub fn exog_start(&self) -> usize {
        if self.allow_contemporaneous {
            0
        } else {
            1
        }
    }

    /// ΔL13 lags in the equation
    pub fn l13_lags(&self) -> Vec<usize> {
        self.q.map_or_else(Vec::new, |q| (self.exog_start()..=q).collect())
    }

    /// ΔL3 lags in the equation
    pub fn l3_lags(&self) -> Vec<usize> {
        self.r.map_or_else(Vec::new, |r| (self.exog_start()..=r).collect())
    }

    /// Deepest lag of any differenced series
    pub fn max_lag(&self) -> usize {
        self.p.max(self.q.unwrap_or(0)).max(self.r.unwrap_or(0))
    }

    /// Whether a lag-0 exogenous regressor is present
    pub fn has_contemporaneous(&self) -> bool {
        self.allow_contemporaneous && (self.q.is_some() || self.r.is_some())
    }

    /// Column names in design order
    pub fn regressor_names(&self) -> Vec<String> {
        let mut names = vec!["const".to_string()];
        names.extend((1..=self.p).map(|i| format!("dL1_lag{}", i)));
        names.extend(self.l13_lags().into_iter().map(|j| format!("dL13_lag{}", j)));
        names.extend(self.l3_lags().into_iter().map(|m| format!("dL3_lag{}", m)));
        names.push("u_lag1".to_string());
        names
    }

    /// Rows required to refit at a forecast origin: `1 + p + max(q, r) + 3`,
    /// an excluded term counting as -1.
    pub fn min_forecast_rows(&self) -> usize {
        let as_lag = |v: Option<usize>| v.map_or(-1, |v| v as i64);
        let cross = as_lag(self.q).max(as_lag(self.r));
        (1 + self.p as i64 + cross + 3).max(0) as usize
    }
}

impl fmt::Display for EcmSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<usize>| v.map_or_else(|| "excluded".to_string(), |v| v.to_string());
        write!(f, "(p={}, q={}, r={})", self.p, show(self.q), show(self.r))
    }
}

/// Differenced series aligned on ΔL1 rows.
///
/// Row `t` holds the change from level row `t` to `t + 1` and `u_lag1[t]`
/// is the equilibrium error at level row `t`.
#[derive(Debug, Clone)]
pub(crate) struct ShortRunData {
    pub dl1: Vec<f64>,
    pub dl13: Vec<f64>,
    pub dl3: Vec<f64>,
    pub u_lag1: Vec<f64>,
}

impl ShortRunData {
    pub fn new(levels: &LevelSeries, ect: &[f64]) -> Self {
        let rows = levels.len().saturating_sub(1);
        Self {
            dl1: diff(&levels.l1),
            dl13: diff(&levels.l13),
            dl3: diff(&levels.l3),
            u_lag1: ect[..rows.min(ect.len())].to_vec(),
        }
    }

    /// Equilibrium errors recomputed from fixed coefficients
    pub fn from_coefficients(levels: &LevelSeries, coefficients: &CointegrationCoefficients) -> Self {
        let ect: Vec<f64> = (0..levels.len())
            .map(|i| coefficients.equilibrium_error(levels.l1[i], levels.l13[i], levels.trend[i]))
            .collect();
        Self::new(levels, &ect)
    }

    pub fn len(&self) -> usize {
        self.dl1.len()
    }
}

/// One design row in [`EcmSpecification::regressor_names`] order.
///
/// Each lookup receives a lag (0 for contemporaneous) and returns the
/// differenced value at that lag.
pub(crate) fn design_row(
    spec: &EcmSpecification,
    u_lag1: f64,
    dl1: impl Fn(usize) -> f64,
    dl13: impl Fn(usize) -> f64,
    dl3: impl Fn(usize) -> f64,
) -> Vec<f64> {
    let mut row = Vec::with_capacity(spec.regressor_names().len());
    row.push(1.0);
    row.extend((1..=spec.p).map(&dl1));
    row.extend(spec.l13_lags().into_iter().map(&dl13));
    row.extend(spec.l3_lags().into_iter().map(&dl3));
    row.push(u_lag1);
    row
}

/// Regression data for one specification
#[derive(Debug, Clone)]
pub(crate) struct Design {
    pub y: Vec<f64>,
    pub x: DMatrix<f64>,
}

impl Design {
    pub fn rows(&self) -> usize {
        self.y.len()
    }
}

/// Rows with every lag available, i.e. `t >= max_lag`
pub(crate) fn build_design(data: &ShortRunData, spec: &EcmSpecification) -> Design {
    let start = spec.max_lag();
    let columns = spec.regressor_names().len();
    let rows = data.len().saturating_sub(start);

    let mut y = Vec::with_capacity(rows);
    let mut values = Vec::with_capacity(rows * columns);
    for t in start..data.len() {
        y.push(data.dl1[t]);
        values.extend(design_row(
            spec,
            data.u_lag1[t],
            |i| data.dl1[t - i],
            |j| data.dl13[t - j],
            |m| data.dl3[t - m],
        ));
    }

    Design {
        x: DMatrix::from_row_slice(y.len(), columns, &values),
        y,
    }
}

/// Why a grid candidate was not fitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    InsufficientRows { rows: usize, required: usize },
    RankDeficient { rank: usize, columns: usize },
    FitFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientRows { rows, required } => {
                write!(f, "{} usable rows, need {}", rows, required)
            }
            SkipReason::RankDeficient { rank, columns } => {
                write!(f, "design rank {} < {} columns", rank, columns)
            }
            SkipReason::FitFailed(msg) => write!(f, "fit failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CandidateOutcome {
    Fitted { criterion: f64, nobs: usize },
    Skipped(SkipReason),
}

/// One grid point and what happened to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub specification: EcmSpecification,
    pub outcome: CandidateOutcome,
}

/// Every candidate visited by the lag search, in enumeration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTrace {
    pub ic_kind: InformationCriterion,
    pub max_lag: usize,
    pub candidates: Vec<Candidate>,
}

impl SearchTrace {
    pub fn fitted(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .filter(|c| matches!(c.outcome, CandidateOutcome::Fitted { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&EcmSpecification, &SkipReason)> {
        self.candidates.iter().filter_map(|c| match &c.outcome {
            CandidateOutcome::Skipped(reason) => Some((&c.specification, reason)),
            CandidateOutcome::Fitted { .. } => None,
        })
    }

    /// First candidate with the strictly lowest criterion
    pub fn best(&self) -> Option<(&EcmSpecification, f64)> {
        let mut best: Option<(&EcmSpecification, f64)> = None;
        for candidate in &self.candidates {
            if let CandidateOutcome::Fitted { criterion, .. } = candidate.outcome {
                if best.map_or(true, |(_, b)| criterion < b) {
                    best = Some((&candidate.specification, criterion));
                }
            }
        }
        best
    }
}

/// Fitted short-run model with its diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct EcmFit {
    pub specification: EcmSpecification,
    pub include_third_series: bool,
    pub regressors: Vec<String>,
    /// HAC inference, normal reference distribution
    pub coefficients: Vec<CoefficientSummary>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub aic: f64,
    pub bic: f64,
    pub ic_kind: InformationCriterion,
    /// Selection criterion of the chosen candidate
    pub criterion_value: f64,
    pub hac_max_lags: usize,
    pub sample_size: usize,
    pub residuals: Vec<f64>,
    pub fitted_values: Vec<f64>,
    /// Coefficient on `u_lag1`
    pub gamma: f64,
    pub gamma_t_value: f64,
    pub gamma_p_value: f64,
    /// Periods for half of a deviation to decay, defined for -1 < γ < 0
    pub half_life: Option<f64>,
    /// |γ| when γ < 0, otherwise 0
    pub ecm_speed: f64,
    /// γ < 0 and significant at 5%
    pub is_valid: bool,
    pub ljung_box: Option<LjungBox>,
    pub breusch_pagan: Option<TestResult>,
    pub jarque_bera: Option<JarqueBera>,
    pub search: SearchTrace,
}

impl EcmFit {
    /// Estimate of a named regressor
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.estimate)
    }

    /// One-line description of the estimated equation
    pub fn description(&self) -> String {
        let verdict = if self.is_valid {
            "valid error correction"
        } else if self.gamma < 0.0 {
            "negative but insignificant error correction"
        } else {
            "no error correction"
        };
        format!(
            "ECM{} on {} rows, {} = {:.4}, γ = {:.4} (p = {:.4}), {}",
            self.specification,
            self.sample_size,
            self.ic_kind,
            self.criterion_value,
            self.gamma,
            self.gamma_p_value,
            verdict
        )
    }
}

/// Half-life `-ln 2 / ln(1 + γ)`, defined only for -1 < γ < 0
pub fn half_life(gamma: f64) -> Option<f64> {
    (gamma > -1.0 && gamma < 0.0).then(|| -std::f64::consts::LN_2 / (1.0 + gamma).ln())
}

/// Largest lag searched: `min(cap, max(1, T / 8))`
pub fn search_max_lag(effective_rows: usize, cap: usize) -> usize {
    cap.min((effective_rows / 8).max(1))
}

fn enumerate_grid(max_lag: usize, options: &EcmOptions) -> Vec<EcmSpecification> {
    let start = if options.allow_contemporaneous { 0 } else { 1 };
    let exog_range = |enabled: bool| -> Vec<Option<usize>> {
        if !enabled || start > max_lag {
            vec![None]
        } else {
            (start..=max_lag).map(Some).collect()
        }
    };
    let q_values = exog_range(true);
    let r_values = exog_range(options.include_third_series);

    let mut grid = Vec::with_capacity(max_lag * q_values.len() * r_values.len());
    for p in 1..=max_lag {
        for &q in &q_values {
            for &r in &r_values {
                grid.push(EcmSpecification::new(p, q, r, options.allow_contemporaneous));
            }
        }
    }
    grid
}

/// Equilibrium error for each complete row: the stored residual when the
/// row was in the cointegration sample, otherwise recomputed.
fn error_correction_term(levels: &LevelSeries, cointegration: &CointegrationResult) -> Vec<f64> {
    let c = &cointegration.coefficients;
    (0..levels.len())
        .map(|i| {
            cointegration
                .residual_at(levels.dates[i])
                .unwrap_or_else(|| c.equilibrium_error(levels.l1[i], levels.l13[i], levels.trend[i]))
        })
        .collect()
}

fn evaluate_candidate(
    data: &ShortRunData,
    spec: &EcmSpecification,
    covariance: CovarianceType,
    ic_kind: InformationCriterion,
) -> CandidateOutcome {
    let design = build_design(data, spec);
    if design.rows() < MIN_SEARCH_ROWS {
        return CandidateOutcome::Skipped(SkipReason::InsufficientRows {
            rows: design.rows(),
            required: MIN_SEARCH_ROWS,
        });
    }

    let rank = matrix_rank(&design.x);
    if rank < design.x.ncols() {
        return CandidateOutcome::Skipped(SkipReason::RankDeficient {
            rank,
            columns: design.x.ncols(),
        });
    }

    match ols(&design.y, &design.x, covariance) {
        Ok(fit) => CandidateOutcome::Fitted {
            criterion: ic_kind.value(&fit),
            nobs: fit.nobs,
        },
        Err(MathError::SingularMatrix { rank, columns }) => {
            CandidateOutcome::Skipped(SkipReason::RankDeficient { rank, columns })
        }
        Err(err) => CandidateOutcome::Skipped(SkipReason::FitFailed(err.to_string())),
    }
}

/// Search the lag grid, refit the winner with HAC covariance and run diagnostics
pub fn build_ecm(
    panel: &TimeSeriesPanel,
    cointegration: &CointegrationResult,
    options: &EcmOptions,
) -> Result<EcmFit> {
    options.validate()?;

    let levels = panel.complete_levels();
    if levels.len() < 3 {
        return Err(EcmError::ValidationError(format!(
            "Need at least 3 complete rows to build the ECM, have {}",
            levels.len()
        )));
    }

    let ect = error_correction_term(&levels, cointegration);
    let data = ShortRunData::new(&levels, &ect);

    for (name, series) in [("dL1", &data.dl1), ("dL13", &data.dl13), ("dL3", &data.dl3)] {
        let sd = std_dev(series)?;
        debug!(series = name, std = sd, "Differenced series spread");
        if !(sd >= MIN_DIFF_STD) {
            return Err(EcmError::ValidationError(format!(
                "Differenced series {} is near-constant (std {:.3e})",
                name, sd
            )));
        }
    }

    let effective_rows = data.len();
    let hac_max_lags = options
        .hac_max_lags
        .unwrap_or_else(|| newey_west_lags(effective_rows));
    let covariance = CovarianceType::Hac {
        max_lags: hac_max_lags,
    };

    let max_lag = search_max_lag(effective_rows, options.max_lag_cap);
    let grid = enumerate_grid(max_lag, options);
    debug!(
        combinations = grid.len(),
        max_lag,
        hac_max_lags,
        ic = %options.ic_kind,
        "Starting lag search"
    );

    let candidates: Vec<Candidate> = grid
        .into_iter()
        .map(|spec| {
            let outcome = evaluate_candidate(&data, &spec, covariance, options.ic_kind);
            if let CandidateOutcome::Skipped(reason) = &outcome {
                debug!(spec = %spec, reason = %reason, "Skipped lag candidate");
            }
            Candidate {
                specification: spec,
                outcome,
            }
        })
        .collect();

    let search = SearchTrace {
        ic_kind: options.ic_kind,
        max_lag,
        candidates,
    };

    let (specification, criterion_value) = match search.best() {
        Some((spec, value)) => (*spec, value),
        None => {
            return Err(EcmError::SearchExhaustionError {
                combinations: search.candidates.len(),
            })
        }
    };
    info!(
        spec = %specification,
        criterion = criterion_value,
        fitted = search.fitted().count(),
        skipped = search.skipped().count(),
        "Selected ECM lags"
    );

    let design = build_design(&data, &specification);
    let fit = ols(&design.y, &design.x, covariance)?;
    let regressors = specification.regressor_names();
    let gamma_idx = regressors.len() - 1;

    let ljung_box = ljung_box_lags(fit.residuals.len()).and_then(|lags| {
        ljung_box(&fit.residuals, lags)
            .map_err(|err| warn!(error = %err, "Ljung-Box test failed"))
            .ok()
    });
    let breusch_pagan = breusch_pagan(&fit.residuals, &design.x)
        .map_err(|err| warn!(error = %err, "Breusch-Pagan test failed"))
        .ok();
    let jarque_bera = jarque_bera(&fit.residuals)
        .map_err(|err| warn!(error = %err, "Jarque-Bera test failed"))
        .ok();

    let gamma = fit.params[gamma_idx];
    let gamma_p_value = fit.p_values[gamma_idx];
    let is_valid = gamma < 0.0 && gamma_p_value < GAMMA_SIGNIFICANCE;

    info!(
        gamma,
        p_value = gamma_p_value,
        r_squared = fit.r_squared,
        n = fit.nobs,
        is_valid,
        "Estimated error correction model"
    );

    Ok(EcmFit {
        specification,
        include_third_series: options.include_third_series,
        coefficients: CoefficientSummary::from_fit(&regressors, &fit),
        regressors,
        r_squared: fit.r_squared,
        adj_r_squared: fit.adj_r_squared,
        aic: fit.aic,
        bic: fit.bic,
        ic_kind: options.ic_kind,
        criterion_value,
        hac_max_lags,
        sample_size: fit.nobs,
        gamma,
        gamma_t_value: fit.t_values[gamma_idx],
        gamma_p_value,
        half_life: half_life(gamma),
        ecm_speed: if gamma < 0.0 { gamma.abs() } else { 0.0 },
        is_valid,
        ljung_box,
        breusch_pagan,
        jarque_bera,
        search,
        residuals: fit.residuals,
        fitted_values: fit.fitted_values,
    })
}
