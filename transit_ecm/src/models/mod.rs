//! Baseline forecasting models compared against the ECM

use crate::error::{EcmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

pub mod arima;
pub mod random_walk;

pub use arima::DriftArima;
pub use random_walk::RandomWalk;

/// The three competing forecasts recorded per origin and horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "ECM")]
    Ecm,
    #[serde(rename = "Random Walk")]
    RandomWalk,
    #[serde(rename = "ARIMA(0,1,0)")]
    Arima,
}

impl ModelKind {
    /// Report order
    pub const ALL: [ModelKind; 3] = [ModelKind::Ecm, ModelKind::RandomWalk, ModelKind::Arima];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Ecm => "ECM",
            ModelKind::RandomWalk => "Random Walk",
            ModelKind::Arima => "ARIMA(0,1,0)",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    values: Vec<f64>,
    horizons: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(EcmError::ValidationError(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        Ok(Self { values, horizons })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Value `h` steps ahead (1-based)
    pub fn at(&self, h: usize) -> Option<f64> {
        h.checked_sub(1).and_then(|i| self.values.get(i)).copied()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a level history
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on observations in time order
    fn train(&self, history: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
