//! End-to-end run and the headline numbers

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};
use transit_ecm::align::{align, impute_missing, impute_missing_with_rng};
use transit_ecm::cointegration::{estimate_cointegration, CointegrationResult};
use transit_ecm::ecm::{build_ecm, EcmFit, EcmSpecification};
use transit_ecm::forecast::{evaluate_forecasts, ForecastEvaluation, HORIZONS};
use transit_ecm::{AlignMode, ModelKind, PipelineConfig, Result, RouteSources, TimeSeriesPanel};

/// |γ| above which the summary reports an error-correcting relationship
pub const COINTEGRATION_GAMMA_THRESHOLD: f64 = 0.1;

/// ECM against persistence at one horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonSummary {
    pub horizon: usize,
    pub ecm_rmse: f64,
    pub random_walk_rmse: f64,
    /// `(rw - ecm) / rw * 100`; `None` when the random walk is exact
    pub improvement_pct: Option<f64>,
    pub best_model: ModelKind,
}

/// Headline numbers of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    /// Long-run coefficient on L13
    pub beta_l13: f64,
    /// Long-run coefficient on the trend
    pub beta_trend: f64,
    pub cointegration_r_squared: f64,
    pub gamma: f64,
    pub lags: EcmSpecification,
    pub half_life: Option<f64>,
    pub ecm_valid: bool,
    pub cointegration_detected: bool,
    pub n_observations: usize,
    pub n_test: usize,
    pub horizons: Vec<HorizonSummary>,
    pub avg_improvement_pct: Option<f64>,
    /// Horizon with the largest improvement over the random walk
    pub best_horizon: Option<usize>,
}

impl KeyMetrics {
    fn collect(
        cointegration: &CointegrationResult,
        ecm: &EcmFit,
        evaluation: &ForecastEvaluation,
        n_observations: usize,
    ) -> Self {
        let horizons: Vec<HorizonSummary> = HORIZONS
            .iter()
            .filter_map(|&h| {
                let ecm_rmse = evaluation.metric(ModelKind::Ecm, h)?.rmse;
                let random_walk_rmse = evaluation.metric(ModelKind::RandomWalk, h)?.rmse;
                let best_model = evaluation
                    .best_by_horizon
                    .iter()
                    .find(|b| b.horizon == h)?
                    .model;
                let improvement_pct = (random_walk_rmse.abs() > f64::EPSILON)
                    .then(|| (random_walk_rmse - ecm_rmse) / random_walk_rmse * 100.0);
                Some(HorizonSummary {
                    horizon: h,
                    ecm_rmse,
                    random_walk_rmse,
                    improvement_pct,
                    best_model,
                })
            })
            .collect();

        let improvements: Vec<(usize, f64)> = horizons
            .iter()
            .filter_map(|s| s.improvement_pct.map(|pct| (s.horizon, pct)))
            .collect();
        let avg_improvement_pct = (!improvements.is_empty())
            .then(|| improvements.iter().map(|(_, pct)| pct).sum::<f64>() / improvements.len() as f64);
        let best_horizon = improvements
            .iter()
            .fold(None::<(usize, f64)>, |best, &(h, pct)| match best {
                Some((_, top)) if top >= pct => best,
                _ => Some((h, pct)),
            })
            .map(|(h, _)| h);

        Self {
            beta_l13: cointegration.coefficients.l13,
            beta_trend: cointegration.coefficients.trend,
            cointegration_r_squared: cointegration.r_squared,
            gamma: ecm.gamma,
            lags: ecm.specification,
            half_life: ecm.half_life,
            ecm_valid: ecm.is_valid,
            cointegration_detected: ecm.gamma.abs() > COINTEGRATION_GAMMA_THRESHOLD,
            n_observations,
            n_test: evaluation.n_test,
            horizons,
            avg_improvement_pct,
            best_horizon,
        }
    }
}

/// Every stage result of one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub config: PipelineConfig,
    /// Panel the models were estimated on
    pub panel: TimeSeriesPanel,
    /// L1 values filled from the cointegrating relation (anchor mode only)
    pub imputed_rows: usize,
    pub cointegration: CointegrationResult,
    pub ecm: EcmFit,
    pub evaluation: ForecastEvaluation,
    pub key_metrics: KeyMetrics,
}

/// Anchor on L13, fill L1 from the observed-row regression and keep the
/// rows where L3 is present.
///
/// Dropping L3 gaps leaves holes in the trend, so the panel stays
/// [`Anchored`](transit_ecm::data::PanelKind::Anchored) and differences
/// span the skipped weeks.
fn implied_panel(sources: &RouteSources, config: &PipelineConfig) -> Result<(TimeSeriesPanel, usize)> {
    let anchored = align(sources, AlignMode::Anchor)?;
    let observed = estimate_cointegration(&anchored)?;

    let imputed = match config.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            impute_missing_with_rng(&anchored, &observed, config.residual_mode, &mut rng)?
        }
        None => impute_missing(&anchored, &observed, config.residual_mode)?,
    };
    let imputed_rows = imputed.l1_observed().iter().filter(|&&o| !o).count();

    let panel = imputed.complete_panel()?;
    let dropped = imputed.len() - panel.len();
    if dropped > 0 {
        warn!(
            dropped,
            kind = ?panel.kind(),
            "Dropped weeks without L3; differences span the gaps"
        );
    }

    Ok((panel, imputed_rows))
}

/// Align, estimate, select lags, backtest and summarise
pub fn run_pipeline(sources: &RouteSources, config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;

    let (panel, imputed_rows) = match config.align_mode {
        AlignMode::InnerJoin => (align(sources, AlignMode::InnerJoin)?, 0),
        AlignMode::Anchor => implied_panel(sources, config)?,
    };
    info!(rows = panel.len(), imputed_rows, mode = ?config.align_mode, "Panel ready");

    let cointegration = estimate_cointegration(&panel)?;
    let ecm = build_ecm(&panel, &cointegration, &config.ecm)?;
    let evaluation = evaluate_forecasts(&panel, &cointegration, &ecm.specification, &config.forecast)?;

    let key_metrics = KeyMetrics::collect(&cointegration, &ecm, &evaluation, panel.len());
    info!(
        gamma = key_metrics.gamma,
        lags = %key_metrics.lags,
        avg_improvement = ?key_metrics.avg_improvement_pct,
        best_horizon = ?key_metrics.best_horizon,
        "Pipeline finished"
    );

    Ok(PipelineReport {
        config: config.clone(),
        panel,
        imputed_rows,
        cointegration,
        ecm,
        evaluation,
        key_metrics,
    })
}
