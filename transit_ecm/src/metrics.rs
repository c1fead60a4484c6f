//! Accuracy metrics for the rolling backtest

use crate::error::{EcmError, Result};
use crate::forecast::ForecastRecord;
use crate::models::ModelKind;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Accuracy of one forecast series against its actuals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Percent; `None` when every actual is zero
    pub mape: Option<f64>,
}

/// Calculate accuracy metrics for a forecast vs actual values.
///
/// MAPE averages only over rows with a non-zero actual.
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(EcmError::ValidationError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual)
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    let percentage: Vec<f64> = actual
        .iter()
        .zip(&errors)
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e / a).abs() * 100.0)
        .collect();
    let mape = transit_math::series::mean(&percentage);

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
    })
}

/// Metrics for one model at one horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub model: ModelKind,
    pub horizon: usize,
    pub rmse: f64,
    pub mae: f64,
    pub mape: Option<f64>,
    /// Number of forecasts scored
    pub count: usize,
}

/// RMSE, MAE and MAPE per model for each horizon present in `records`.
///
/// Rows are ordered by horizon, then by [`ModelKind::ALL`].
pub fn horizon_metrics(records: &[ForecastRecord]) -> Result<Vec<MetricRow>> {
    let mut horizons: Vec<usize> = records.iter().map(|r| r.horizon).collect();
    horizons.sort_unstable();
    horizons.dedup();

    let mut rows = Vec::with_capacity(horizons.len() * ModelKind::ALL.len());
    for horizon in horizons {
        let subset: Vec<&ForecastRecord> =
            records.iter().filter(|r| r.horizon == horizon).collect();
        let actual: Vec<f64> = subset.iter().map(|r| r.actual).collect();

        for model in ModelKind::ALL {
            let predicted: Vec<f64> = subset.iter().map(|r| r.prediction(model)).collect();
            let accuracy = forecast_accuracy(&predicted, &actual)?;
            rows.push(MetricRow {
                model,
                horizon,
                rmse: accuracy.rmse,
                mae: accuracy.mae,
                mape: accuracy.mape,
                count: subset.len(),
            });
        }
    }

    Ok(rows)
}

/// Metrics at `horizon` sorted by ascending RMSE; ties keep input order
pub fn rank_by_rmse(metrics: &[MetricRow], horizon: usize) -> Vec<&MetricRow> {
    let mut ranked: Vec<&MetricRow> = metrics.iter().filter(|m| m.horizon == horizon).collect();
    ranked.sort_by(|a, b| a.rmse.partial_cmp(&b.rmse).unwrap_or(Ordering::Equal));
    ranked
}

/// Lowest-RMSE model at one horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonBest {
    pub horizon: usize,
    pub model: ModelKind,
    pub rmse: f64,
}

/// Best model per horizon, in horizon order
pub fn best_by_horizon(metrics: &[MetricRow]) -> Vec<HorizonBest> {
    let mut horizons: Vec<usize> = metrics.iter().map(|m| m.horizon).collect();
    horizons.sort_unstable();
    horizons.dedup();

    horizons
        .into_iter()
        .filter_map(|h| {
            rank_by_rmse(metrics, h).first().map(|m| HorizonBest {
                horizon: h,
                model: m.model,
                rmse: m.rmse,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forecast_accuracy() {
        let accuracy = forecast_accuracy(&[1.0, 2.0, 5.0], &[2.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(accuracy.mae, 1.0);
        assert_relative_eq!(accuracy.mse, 5.0 / 3.0);
        assert_relative_eq!(accuracy.rmse, (5.0f64 / 3.0).sqrt());
        assert_relative_eq!(accuracy.mape.unwrap(), (50.0 + 0.0 + 200.0 / 3.0) / 3.0);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let accuracy = forecast_accuracy(&[1.0, 1.0], &[0.0, 2.0]).unwrap();
        assert_relative_eq!(accuracy.mape.unwrap(), 50.0);

        let accuracy = forecast_accuracy(&[1.0], &[0.0]).unwrap();
        assert_eq!(accuracy.mape, None);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let row = |model, rmse| MetricRow {
            model,
            horizon: 1,
            rmse,
            mae: rmse,
            mape: None,
            count: 1,
        };
        let metrics = vec![
            row(ModelKind::Ecm, 0.5),
            row(ModelKind::RandomWalk, 0.3),
            row(ModelKind::Arima, 0.3),
        ];

        let ranked: Vec<ModelKind> = rank_by_rmse(&metrics, 1).iter().map(|m| m.model).collect();
        assert_eq!(ranked, vec![ModelKind::RandomWalk, ModelKind::Arima, ModelKind::Ecm]);
        assert_eq!(best_by_horizon(&metrics)[0].model, ModelKind::RandomWalk);
        assert!(rank_by_rmse(&metrics, 2).is_empty());
    }
}
