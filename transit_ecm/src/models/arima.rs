//! ARIMA(0,1,0) with drift

use crate::error::{EcmError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use transit_math::series::{diff, mean};

/// Random walk with a constant drift estimated from the mean first difference
#[derive(Debug, Clone, Default)]
pub struct DriftArima;

/// Trained ARIMA(0,1,0) model
#[derive(Debug, Clone)]
pub struct TrainedDriftArima {
    last: f64,
    drift: f64,
}

impl TrainedDriftArima {
    /// Mean first difference of the training history
    pub fn drift(&self) -> f64 {
        self.drift
    }
}

impl ForecastModel for DriftArima {
    type Trained = TrainedDriftArima;

    fn train(&self, history: &[f64]) -> Result<TrainedDriftArima> {
        if history.len() < 2 {
            return Err(EcmError::ValidationError(format!(
                "ARIMA(0,1,0) needs at least 2 observations, have {}",
                history.len()
            )));
        }

        let drift = mean(&diff(history)).unwrap_or(f64::NAN);
        let last = history[history.len() - 1];
        if !drift.is_finite() || !last.is_finite() {
            return Err(EcmError::MathError(transit_math::MathError::CalculationError(
                "ARIMA(0,1,0) drift is not finite".to_string(),
            )));
        }

        Ok(TrainedDriftArima { last, drift })
    }

    fn name(&self) -> &str {
        "ARIMA(0,1,0)"
    }
}

impl TrainedForecastModel for TrainedDriftArima {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        let values = (1..=horizons)
            .map(|h| self.last + h as f64 * self.drift)
            .collect();
        ForecastResult::new(values, horizons)
    }

    fn name(&self) -> &str {
        "ARIMA(0,1,0)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_drift_forecast() {
        let trained = DriftArima.train(&[1.0, 2.0, 2.5, 4.0]).unwrap();
        assert_relative_eq!(trained.drift(), 1.0);

        let forecast = trained.forecast(4).unwrap();
        assert_eq!(forecast.values(), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(forecast.at(2), Some(6.0));
        assert_eq!(forecast.at(0), None);
    }

    #[test]
    fn test_too_short_history() {
        assert!(DriftArima.train(&[1.0]).is_err());
        assert!(DriftArima.train(&[1.0, f64::INFINITY]).is_err());
    }
}
