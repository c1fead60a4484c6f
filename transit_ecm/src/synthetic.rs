//! Seeded cointegrated route data for tests and demos
//!
//! The anchor route carries a random walk, a linear trend and an annual
//! cycle over weekly observations. Line 1 is tied to it in the long run:
//!
//! ```text
//! L13 = 8 + 0.02 t + 0.5 sin(2πt/26) + w_t
//! L1  = 2 + 0.8 L13 + 0.01 t + e1_t
//! L3  = 6 + 0.5 w_t + 0.3 cos(2πt/26) + 0.015 t + e3_t
//! ```

use crate::align::align;
use crate::config::AlignMode;
use crate::data::{Route, RouteSources, RouteTable, TimeSeriesPanel};
use crate::error::{EcmError, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Long-run coefficient on L13 used by the generator
pub const TRUE_BETA_L13: f64 = 0.8;
/// Long-run coefficient on the trend used by the generator
pub const TRUE_BETA_TREND: f64 = 0.01;

const RANDOM_WALK_SIGMA: f64 = 0.3;
const L1_NOISE_SIGMA: f64 = 0.5;
const L3_NOISE_SIGMA: f64 = 0.4;
const SEASON: f64 = 26.0;

fn normal(sigma: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, sigma).map_err(|e| EcmError::ValidationError(e.to_string()))
}

/// Three weekly routes of length `n`, identical for identical seeds
pub fn cointegrated_routes(n: usize, seed: u64) -> Result<RouteSources> {
    if n < 2 {
        return Err(EcmError::ValidationError(format!(
            "Synthetic series need at least 2 observations, got {}",
            n
        )));
    }

    let start = NaiveDate::from_ymd_opt(2015, 1, 5)
        .ok_or_else(|| EcmError::DataError("Invalid start date".to_string()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let walk_step = normal(RANDOM_WALK_SIGMA)?;
    let l1_noise = normal(L1_NOISE_SIGMA)?;
    let l3_noise = normal(L3_NOISE_SIGMA)?;

    let mut line1 = Vec::with_capacity(n);
    let mut line3 = Vec::with_capacity(n);
    let mut line13 = Vec::with_capacity(n);

    let mut walk = 0.0;
    for i in 0..n {
        let t = i as f64;
        walk += walk_step.sample(&mut rng);
        let date = start + Duration::weeks(i as i64);
        let phase = 2.0 * PI * t / SEASON;

        let l13 = 8.0 + 0.02 * t + 0.5 * phase.sin() + walk;
        let l1 = 2.0 + TRUE_BETA_L13 * l13 + TRUE_BETA_TREND * t + l1_noise.sample(&mut rng);
        let l3 = 6.0 + 0.5 * walk + 0.3 * phase.cos() + 0.015 * t + l3_noise.sample(&mut rng);

        line1.push((date, l1));
        line3.push((date, l3));
        line13.push((date, l13));
    }

    Ok(RouteSources::new(
        RouteTable::from_observations(Route::Line1, &line1)?,
        RouteTable::from_observations(Route::Line3, &line3)?,
        RouteTable::from_observations(Route::Line13, &line13)?,
    ))
}

/// Inner-joined panel of [`cointegrated_routes`]
pub fn cointegrated_panel(n: usize, seed: u64) -> Result<TimeSeriesPanel> {
    align(&cointegrated_routes(n, seed)?, AlignMode::InnerJoin)
}
