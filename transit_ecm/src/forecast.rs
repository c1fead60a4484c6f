//! Rolling-origin backtest of the ECM against persistence and drift baselines
//!
//! At every origin the short-run coefficients are refitted on the data seen
//! so far, with the lag structure fixed by [`build_ecm`](crate::ecm::build_ecm)
//! and the equilibrium error computed from fixed cointegration coefficients.
//! Multi-step forecasts are built recursively: predicted ΔL1 values feed the
//! later steps, exogenous routes are held at their last level and the trend
//! advances by one per step.

use crate::cointegration::{CointegrationCoefficients, CointegrationResult};
use crate::config::{ExogNowcast, ForecastOptions};
use crate::data::{LevelSeries, TimeSeriesPanel};
use crate::ecm::{build_design, design_row, EcmSpecification, ShortRunData};
use crate::error::{EcmError, Result};
use crate::metrics::{best_by_horizon, horizon_metrics, HorizonBest, MetricRow};
use crate::models::{DriftArima, ForecastModel, ModelKind, RandomWalk, TrainedForecastModel};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use transit_math::regression::ols;
use transit_math::rolling::{LagBuffer, TrailingMean};
use transit_math::series::autocorrelation;
use transit_math::CovarianceType;

/// Forecast horizons evaluated at every origin
pub const HORIZONS: [usize; 4] = [1, 2, 3, 4];
pub const MAX_HORIZON: usize = 4;

/// Observations required beyond the test window
pub const MIN_TRAIN_OBSERVATIONS: usize = 10;

/// One forecast target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Date of the last observation available to the forecaster
    pub origin: NaiveDate,
    /// Date being forecast
    pub date: NaiveDate,
    pub horizon: usize,
    pub actual: f64,
    pub ecm: f64,
    pub random_walk: f64,
    pub arima: f64,
}

impl ForecastRecord {
    pub fn prediction(&self, model: ModelKind) -> f64 {
        match model {
            ModelKind::Ecm => self.ecm,
            ModelKind::RandomWalk => self.random_walk,
            ModelKind::Arima => self.arima,
        }
    }
}

/// A model that fell back to persistence at one origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginFailure {
    pub origin: NaiveDate,
    pub model: ModelKind,
    pub reason: String,
}

/// Outcome of the rolling backtest
#[derive(Debug, Clone, Serialize)]
pub struct ForecastEvaluation {
    pub records: Vec<ForecastRecord>,
    pub metrics: Vec<MetricRow>,
    pub best_by_horizon: Vec<HorizonBest>,
    pub failures: Vec<OriginFailure>,
    pub specification: EcmSpecification,
    pub exog_nowcast: ExogNowcast,
    pub n_test: usize,
    pub origins: usize,
    pub total_forecasts: usize,
}

impl ForecastEvaluation {
    /// Metric row for a model at a horizon
    pub fn metric(&self, model: ModelKind, horizon: usize) -> Option<&MetricRow> {
        self.metrics
            .iter()
            .find(|m| m.model == model && m.horizon == horizon)
    }

    pub fn records_for_horizon(&self, horizon: usize) -> impl Iterator<Item = &ForecastRecord> {
        self.records.iter().filter(move |r| r.horizon == horizon)
    }

    /// Records as a frame: origin, date, horizon, actual, ecm, random_walk, arima
    pub fn records_frame(&self) -> Result<DataFrame> {
        let days = |f: fn(&ForecastRecord) -> NaiveDate| -> Vec<i32> {
            self.records
                .iter()
                .map(|r| crate::data::date_to_days(f(r)))
                .collect()
        };
        let floats = |f: fn(&ForecastRecord) -> f64| -> Vec<f64> {
            self.records.iter().map(f).collect()
        };

        let df = DataFrame::new(vec![
            Series::new("origin", days(|r| r.origin)).cast(&DataType::Date)?,
            Series::new("date", days(|r| r.date)).cast(&DataType::Date)?,
            Series::new(
                "horizon",
                self.records.iter().map(|r| r.horizon as u32).collect::<Vec<u32>>(),
            ),
            Series::new("actual", floats(|r| r.actual)),
            Series::new("ecm", floats(|r| r.ecm)),
            Series::new("random_walk", floats(|r| r.random_walk)),
            Series::new("arima", floats(|r| r.arima)),
        ])?;

        Ok(df)
    }

    /// Metrics as a frame: model, horizon, RMSE, MAE, MAPE, count
    pub fn metrics_frame(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new(
                "model",
                self.metrics.iter().map(|m| m.model.name()).collect::<Vec<&str>>(),
            ),
            Series::new(
                "horizon",
                self.metrics.iter().map(|m| m.horizon as u32).collect::<Vec<u32>>(),
            ),
            Series::new("RMSE", self.metrics.iter().map(|m| m.rmse).collect::<Vec<f64>>()),
            Series::new("MAE", self.metrics.iter().map(|m| m.mae).collect::<Vec<f64>>()),
            Series::new(
                "MAPE",
                self.metrics.iter().map(|m| m.mape).collect::<Vec<Option<f64>>>(),
            ),
            Series::new(
                "count",
                self.metrics.iter().map(|m| m.count as u32).collect::<Vec<u32>>(),
            ),
        ])?;

        Ok(df)
    }
}

/// Contemporaneous exogenous difference expected for the next step
pub fn nowcast_difference(diffs: &[f64], policy: ExogNowcast) -> f64 {
    if diffs.is_empty() {
        return 0.0;
    }

    match policy {
        ExogNowcast::MovingAverage { lookback } => {
            TrailingMean::from_values(lookback.clamp(1, diffs.len()), diffs)
                .and_then(|mean| mean.value())
                .unwrap_or(0.0)
        }
        ExogNowcast::Ar1 => {
            let last = diffs[diffs.len() - 1];
            let phi = autocorrelation(diffs, 1)
                .filter(|phi| phi.is_finite())
                .unwrap_or(0.0);
            phi * last
        }
    }
}

/// Recursive ECM path for one origin, refitted on `train`
fn ecm_path(
    train: &LevelSeries,
    coefficients: &CointegrationCoefficients,
    spec: &EcmSpecification,
    policy: ExogNowcast,
) -> Result<[f64; MAX_HORIZON]> {
    let data = ShortRunData::from_coefficients(train, coefficients);
    let design = build_design(&data, spec);

    let required = spec.min_forecast_rows();
    if design.rows() < required {
        return Err(EcmError::ValidationError(format!(
            "Insufficient rows after lagging: need {}, have {}",
            required,
            design.rows()
        )));
    }

    let fit = ols(&design.y, &design.x, CovarianceType::NonRobust)?;

    let capacity = spec.max_lag().max(1) + MAX_HORIZON;
    let mut dl1_history = LagBuffer::seeded(capacity, &data.dl1)?;
    let mut dl13_history = LagBuffer::seeded(capacity, &data.dl13)?;
    let mut dl3_history = LagBuffer::seeded(capacity, &data.dl3)?;

    let contemporaneous = spec.allow_contemporaneous;
    let dl13_now = if contemporaneous && spec.q.is_some() {
        nowcast_difference(&data.dl13, policy)
    } else {
        0.0
    };
    let dl3_now = if contemporaneous && spec.r.is_some() {
        nowcast_difference(&data.dl3, policy)
    } else {
        0.0
    };

    let last = train.len() - 1;
    let mut l1 = train.l1[last];
    let l13 = train.l13[last];
    let mut trend = train.trend[last];

    let mut path = [0.0; MAX_HORIZON];
    for (step, slot) in path.iter_mut().enumerate() {
        let h = step + 1;
        let exog = |history: &LagBuffer, now: f64, lag: usize| match lag {
            0 if h == 1 => now,
            0 => 0.0,
            _ => history.get(lag).unwrap_or(0.0),
        };

        let row = design_row(
            spec,
            coefficients.equilibrium_error(l1, l13, trend),
            |i| dl1_history.get(i).unwrap_or(0.0),
            |j| exog(&dl13_history, dl13_now, j),
            |m| exog(&dl3_history, dl3_now, m),
        );
        let dl1 = fit.predict(&row)?;

        l1 += dl1;
        trend += 1.0;
        dl1_history.push(dl1);
        dl13_history.push(0.0);
        dl3_history.push(0.0);
        *slot = l1;
    }

    Ok(path)
}

/// Rolling-origin evaluation over the last `n_test` observations.
///
/// Origins run from `n - n_test` to `n - 4`, so every origin yields all four
/// horizons. A failed ECM or ARIMA fit at one origin falls back to the
/// random-walk values for that origin and is recorded in `failures`.
pub fn evaluate_forecasts(
    panel: &TimeSeriesPanel,
    cointegration: &CointegrationResult,
    spec: &EcmSpecification,
    options: &ForecastOptions,
) -> Result<ForecastEvaluation> {
    options.validate()?;

    let levels = panel.complete_levels();
    let n = levels.len();
    let n_test = options.n_test;
    if n < n_test + MIN_TRAIN_OBSERVATIONS {
        return Err(EcmError::ValidationError(format!(
            "Insufficient data: need at least {} observations, have {}",
            n_test + MIN_TRAIN_OBSERVATIONS,
            n
        )));
    }

    let coefficients = cointegration.coefficients;
    let n_train = n - n_test;
    let mut records = Vec::with_capacity((n_test + 1 - MAX_HORIZON) * MAX_HORIZON);
    let mut failures = Vec::new();
    let mut origins = 0;

    debug!(n, n_train, n_test, spec = %spec, nowcast = %options.exog_nowcast, "Starting rolling forecasts");

    for i in n_train..=(n - MAX_HORIZON) {
        let train = levels.head(i);
        let origin = levels.dates[i - 1];
        origins += 1;

        let persistence = RandomWalk.train(&train.l1)?.forecast(MAX_HORIZON)?;

        let ecm = match ecm_path(&train, &coefficients, spec, options.exog_nowcast) {
            Ok(path) => path.to_vec(),
            Err(err) => {
                warn!(origin = %origin, error = %err, "ECM forecast failed, using persistence");
                failures.push(OriginFailure {
                    origin,
                    model: ModelKind::Ecm,
                    reason: err.to_string(),
                });
                persistence.values().to_vec()
            }
        };

        let arima = match DriftArima
            .train(&train.l1)
            .and_then(|model| model.forecast(MAX_HORIZON))
        {
            Ok(forecast) => forecast.values().to_vec(),
            Err(err) => {
                warn!(origin = %origin, error = %err, "ARIMA forecast failed, using persistence");
                failures.push(OriginFailure {
                    origin,
                    model: ModelKind::Arima,
                    reason: err.to_string(),
                });
                persistence.values().to_vec()
            }
        };

        for h in HORIZONS {
            let target = i + h - 1;
            if target >= n {
                continue;
            }
            records.push(ForecastRecord {
                origin,
                date: levels.dates[target],
                horizon: h,
                actual: levels.l1[target],
                ecm: ecm[h - 1],
                random_walk: persistence.values()[h - 1],
                arima: arima[h - 1],
            });
        }
    }

    if records.is_empty() {
        return Err(EcmError::ValidationError(
            "No forecasts generated".to_string(),
        ));
    }

    let metrics = horizon_metrics(&records)?;
    let best = best_by_horizon(&metrics);
    for b in &best {
        info!(horizon = b.horizon, model = %b.model, rmse = b.rmse, "Best model by RMSE");
    }

    Ok(ForecastEvaluation {
        total_forecasts: records.len(),
        records,
        metrics,
        best_by_horizon: best,
        failures,
        specification: *spec,
        exog_nowcast: options.exog_nowcast,
        n_test,
        origins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moving_average_nowcast_clamps_lookback() {
        let diffs = [1.0, 2.0, 3.0, 6.0];
        let ma = |lookback| nowcast_difference(&diffs, ExogNowcast::MovingAverage { lookback });
        assert_relative_eq!(ma(2), 4.5);
        assert_relative_eq!(ma(10), 3.0);
        assert_eq!(nowcast_difference(&[], ExogNowcast::Ar1), 0.0);
    }

    #[test]
    fn test_ar1_nowcast() {
        let diffs = [1.0, -1.0, 1.0, -1.0, 1.0];
        assert_relative_eq!(nowcast_difference(&diffs, ExogNowcast::Ar1), -1.0, epsilon = 1e-12);

        let constant = [0.5, 0.5, 0.5];
        assert_eq!(nowcast_difference(&constant, ExogNowcast::Ar1), 0.0);
    }
}
