//! Persistence forecast

use crate::error::{EcmError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};

/// Random walk without drift: every horizon repeats the last observation
#[derive(Debug, Clone, Default)]
pub struct RandomWalk;

#[derive(Debug, Clone)]
pub struct TrainedRandomWalk {
    last: f64,
}

impl TrainedRandomWalk {
    pub fn last(&self) -> f64 {
        self.last
    }
}

impl ForecastModel for RandomWalk {
    type Trained = TrainedRandomWalk;

    fn train(&self, history: &[f64]) -> Result<TrainedRandomWalk> {
        let last = history.last().copied().ok_or_else(|| {
            EcmError::ValidationError("Random walk needs at least one observation".to_string())
        })?;
        Ok(TrainedRandomWalk { last })
    }

    fn name(&self) -> &str {
        "Random Walk"
    }
}

impl TrainedForecastModel for TrainedRandomWalk {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        ForecastResult::new(vec![self.last; horizons], horizons)
    }

    fn name(&self) -> &str {
        "Random Walk"
    }
}
