//! Aligning the route tables onto one timeline and imputing missing L1

use crate::cointegration::CointegrationResult;
use crate::config::{AlignMode, ResidualMode};
use crate::data::{RouteSources, RouteTable, TimeSeriesPanel};
use crate::error::{EcmError, Result};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Merge the three route tables into a panel
pub fn align(sources: &RouteSources, mode: AlignMode) -> Result<TimeSeriesPanel> {
    match mode {
        AlignMode::InnerJoin => align_inner(sources),
        AlignMode::Anchor => align_anchored(sources),
    }
}

/// Date-keyed values of a table, the last row winning on duplicate dates
fn by_date(table: &RouteTable) -> Result<BTreeMap<NaiveDate, f64>> {
    let observations = table.observations()?;
    let raw = observations.len();
    let map: BTreeMap<NaiveDate, f64> = observations.into_iter().collect();
    if map.len() < raw {
        debug!(
            route = %table.route(),
            duplicates = raw - map.len(),
            "Collapsed duplicate dates keeping the last value"
        );
    }
    Ok(map)
}

fn align_inner(sources: &RouteSources) -> Result<TimeSeriesPanel> {
    let l1 = by_date(&sources.line1)?;
    let l3 = by_date(&sources.line3)?;
    let l13 = by_date(&sources.line13)?;

    let common: Vec<NaiveDate> = l13
        .keys()
        .filter(|d| l1.contains_key(d) && l3.contains_key(d))
        .copied()
        .collect();

    if common.is_empty() {
        return Err(EcmError::ValidationError(
            "No dates are shared by all three routes".to_string(),
        ));
    }

    info!(
        l1 = l1.len(),
        l3 = l3.len(),
        l13 = l13.len(),
        common = common.len(),
        "Aligned routes on common dates"
    );

    let pick = |map: &BTreeMap<NaiveDate, f64>| -> Vec<f64> {
        common.iter().filter_map(|d| map.get(d).copied()).collect()
    };
    let (v1, v3, v13) = (pick(&l1), pick(&l3), pick(&l13));

    TimeSeriesPanel::aligned(common, v1, v3, v13)
}

fn align_anchored(sources: &RouteSources) -> Result<TimeSeriesPanel> {
    let anchor = by_date(&sources.line13)?;
    if anchor.is_empty() {
        return Err(EcmError::ValidationError(format!(
            "{} has no valid observations to anchor on",
            sources.line13.route()
        )));
    }

    let optional = |table: &RouteTable| match by_date(table) {
        Ok(map) => map,
        Err(err) => {
            warn!(route = %table.route(), error = %err, "Route unavailable for alignment");
            BTreeMap::new()
        }
    };
    let l1 = optional(&sources.line1);
    let l3 = optional(&sources.line3);

    let dates: Vec<NaiveDate> = anchor.keys().copied().collect();
    let v1: Vec<Option<f64>> = dates.iter().map(|d| l1.get(d).copied()).collect();
    let v3: Vec<Option<f64>> = dates.iter().map(|d| l3.get(d).copied()).collect();
    let v13: Vec<f64> = anchor.values().copied().collect();

    let panel = TimeSeriesPanel::anchored(dates, v1, v3, v13)?;
    info!(
        rows = panel.len(),
        l1_observed = panel.l1_observed().iter().filter(|&&o| o).count(),
        l3_observed = panel.l3_observed().iter().filter(|&&o| o).count(),
        "Anchored alignment on L13"
    );

    Ok(panel)
}

/// Fill unobserved L1 rows from the cointegrating relation using the thread RNG
pub fn impute_missing(
    panel: &TimeSeriesPanel,
    cointegration: &CointegrationResult,
    mode: ResidualMode,
) -> Result<TimeSeriesPanel> {
    impute_missing_with_rng(panel, cointegration, mode, &mut rand::thread_rng())
}

/// Fill unobserved L1 rows with `β0 + β1·L13 + β2·trend + adjustment`.
///
/// Rows flagged as observed are copied unchanged and the observed flags are
/// kept, so running this again on its own output gives the same panel for
/// the zero and mean modes.
pub fn impute_missing_with_rng<R: Rng + ?Sized>(
    panel: &TimeSeriesPanel,
    cointegration: &CointegrationResult,
    mode: ResidualMode,
    rng: &mut R,
) -> Result<TimeSeriesPanel> {
    let residuals: Vec<f64> = cointegration
        .residuals
        .iter()
        .copied()
        .filter(|r| r.is_finite())
        .collect();

    let mode = if mode != ResidualMode::Zero && residuals.is_empty() {
        warn!("No cointegration residuals available, imputing with zero adjustment");
        ResidualMode::Zero
    } else {
        mode
    };
    let mean_residual = transit_math::series::mean(&residuals).unwrap_or(0.0);

    let coefficients = cointegration.coefficients;
    let mut imputed = 0usize;
    let l1: Vec<Option<f64>> = (0..panel.len())
        .map(|i| {
            if panel.l1_observed()[i] {
                return panel.l1()[i];
            }
            let adjustment = match mode {
                ResidualMode::Zero => 0.0,
                ResidualMode::Mean => mean_residual,
                ResidualMode::Sampled => residuals.choose(&mut *rng).copied().unwrap_or(0.0),
            };
            imputed += 1;
            Some(coefficients.long_run_l1(panel.l13()[i], panel.trend()[i] as f64) + adjustment)
        })
        .collect();

    info!(imputed, mode = ?mode, "Imputed missing L1 values");

    TimeSeriesPanel::from_parts(
        panel.kind(),
        panel.dates().to_vec(),
        l1,
        panel.l3().to_vec(),
        panel.l13().to_vec(),
        panel.trend().to_vec(),
        Some((panel.l1_observed().to_vec(), panel.l3_observed().to_vec())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cointegration::estimate_cointegration;
    use crate::data::{PanelKind, Route};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, d).unwrap()
    }

    fn table(route: Route, rows: &[(u32, f64)]) -> RouteTable {
        let obs: Vec<(NaiveDate, f64)> = rows.iter().map(|(d, v)| (day(*d), *v)).collect();
        RouteTable::from_observations(route, &obs).unwrap()
    }

    #[test]
    fn test_inner_join_keeps_common_dates() {
        let sources = RouteSources::new(
            table(Route::Line1, &[(3, 9.0), (1, 8.0), (2, 8.5), (5, 9.5)]),
            table(Route::Line3, &[(1, 12.0), (2, 12.5), (3, 13.0)]),
            table(Route::Line13, &[(2, 10.0), (3, 10.5), (4, 11.0), (5, 11.5)]),
        );

        let panel = align(&sources, AlignMode::InnerJoin).unwrap();
        assert_eq!(panel.dates(), &[day(2), day(3)]);
        assert_eq!(panel.l1(), &[Some(8.5), Some(9.0)]);
        assert_eq!(panel.trend(), &[1, 2]);
        assert_eq!(panel.kind(), PanelKind::Aligned);
    }

    #[test]
    fn test_inner_join_without_overlap_fails() {
        let sources = RouteSources::new(
            table(Route::Line1, &[(1, 8.0)]),
            table(Route::Line3, &[(2, 12.0)]),
            table(Route::Line13, &[(1, 10.0)]),
        );
        assert!(matches!(
            align(&sources, AlignMode::InnerJoin),
            Err(EcmError::ValidationError(_))
        ));
    }

    #[test]
    fn test_anchor_keeps_l13_dates_and_last_duplicate() {
        let sources = RouteSources::new(
            table(Route::Line1, &[(2, 8.0), (2, 8.25), (9, 7.0)]),
            RouteTable::empty(Route::Line3).unwrap(),
            table(Route::Line13, &[(1, 10.0), (2, 10.5), (3, 11.0)]),
        );

        let panel = align(&sources, AlignMode::Anchor).unwrap();
        assert_eq!(panel.len(), 3);
        assert_eq!(panel.l1(), &[None, Some(8.25), None]);
        assert_eq!(panel.l1_observed(), &[false, true, false]);
        assert_eq!(panel.l3_observed(), &[false, false, false]);
        assert_eq!(panel.trend(), &[1, 2, 3]);
    }

    #[test]
    fn test_anchor_requires_l13() {
        let sources = RouteSources::new(
            table(Route::Line1, &[(1, 8.0)]),
            table(Route::Line3, &[(1, 12.0)]),
            RouteTable::empty(Route::Line13).unwrap(),
        );
        assert!(align(&sources, AlignMode::Anchor).is_err());
    }

    fn anchored_panel() -> TimeSeriesPanel {
        let n = 30;
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let dates = (0..n).map(|i| start + chrono::Duration::days(7 * i as i64)).collect();
        let l13: Vec<f64> = (0..n).map(|i| 10.0 + ((i * 3) % 7) as f64 * 0.3).collect();
        let l1 = (0..n)
            .map(|i| {
                if i % 4 == 3 {
                    None
                } else {
                    Some(2.0 + 0.8 * l13[i] + 0.01 * i as f64 + if i % 2 == 0 { 0.1 } else { -0.1 })
                }
            })
            .collect();
        let l3 = (0..n).map(|i| Some(12.0 + 0.01 * i as f64)).collect();
        TimeSeriesPanel::anchored(dates, l1, l3, l13).unwrap()
    }

    #[test]
    fn test_imputation_preserves_observed_rows() {
        let panel = anchored_panel();
        let coint = estimate_cointegration(&panel).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        for mode in [ResidualMode::Zero, ResidualMode::Mean, ResidualMode::Sampled] {
            let filled = impute_missing_with_rng(&panel, &coint, mode, &mut rng).unwrap();
            for i in 0..panel.len() {
                if panel.l1_observed()[i] {
                    assert_eq!(filled.l1()[i], panel.l1()[i]);
                } else {
                    assert!(filled.l1()[i].is_some());
                }
            }
            assert_eq!(filled.l1_observed(), panel.l1_observed());
        }
    }

    #[test]
    fn test_zero_and_mean_imputation_are_idempotent() {
        let panel = anchored_panel();
        let coint = estimate_cointegration(&panel).unwrap();

        for mode in [ResidualMode::Zero, ResidualMode::Mean] {
            let once = impute_missing(&panel, &coint, mode).unwrap();
            let twice = impute_missing(&once, &coint, mode).unwrap();
            assert_eq!(once, twice);
        }

        let zero = impute_missing(&panel, &coint, ResidualMode::Zero).unwrap();
        let c = coint.coefficients;
        let expected = c.long_run_l1(panel.l13()[3], panel.trend()[3] as f64);
        assert_eq!(zero.l1()[3], Some(expected));
    }
}
