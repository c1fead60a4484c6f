//! Route tables, scraped transit records and the aligned panel

use crate::error::{EcmError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Name of the date column in route tables and panel frames
pub const DATE_COLUMN: &str = "Date";
/// Name of the value column in route tables
pub const VALUE_COLUMN: &str = "Gas Transit Days";

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// The three pipeline segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Houston to Greensboro
    Line1,
    /// Greensboro back to Houston
    Line3,
    /// Houston to Linden
    Line13,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Line1, Route::Line3, Route::Line13];

    /// Origin location code
    pub fn origin(&self) -> &'static str {
        match self {
            Route::Line1 | Route::Line13 => "HTN",
            Route::Line3 => "GBJ",
        }
    }

    /// Destination location code
    pub fn destination(&self) -> &'static str {
        match self {
            Route::Line1 => "GBJ",
            Route::Line3 => "HTN",
            Route::Line13 => "LNJ",
        }
    }

    /// Panel column name
    pub fn column(&self) -> &'static str {
        match self {
            Route::Line1 => "L1",
            Route::Line3 => "L3",
            Route::Line13 => "L13",
        }
    }

    /// Route served by an origin/destination pair, if any
    pub fn from_locations(origin: &str, destination: &str) -> Option<Route> {
        let origin = origin.trim();
        let destination = destination.trim();
        Route::ALL
            .into_iter()
            .find(|r| r.origin().eq_ignore_ascii_case(origin) && r.destination().eq_ignore_ascii_case(destination))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}→{})", self.column(), self.origin(), self.destination())
    }
}

/// One row of the scraped transit-time table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Cycle", default)]
    pub cycle: Option<String>,
    #[serde(rename = "Gas Days", default)]
    pub gas_days: Option<f64>,
    #[serde(rename = "Gas Hours", default)]
    pub gas_hours: Option<f64>,
    #[serde(rename = "Distillates Days", default)]
    pub distillates_days: Option<f64>,
    #[serde(rename = "Distillates Hours", default)]
    pub distillates_hours: Option<f64>,
}

impl TransitRecord {
    /// Route of this record, if it is one of the tracked segments
    pub fn route(&self) -> Option<Route> {
        Route::from_locations(&self.from, &self.to)
    }

    /// Gas transit time in fractional days (`days + hours / 24`)
    pub fn gas_transit_days(&self) -> Option<f64> {
        let days = self.gas_days?;
        let value = days + self.gas_hours.unwrap_or(0.0) / 24.0;
        value.is_finite().then_some(value)
    }
}

/// Read scraped transit records from a CSV file with a header row
pub fn read_transit_records<P: AsRef<Path>>(path: P) -> Result<Vec<TransitRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Per-route `(Date, Gas Transit Days)` table
#[derive(Debug, Clone)]
pub struct RouteTable {
    route: Route,
    df: DataFrame,
}

impl RouteTable {
    /// Wrap an existing frame. Columns are checked when the table is read.
    pub fn new(route: Route, df: DataFrame) -> Self {
        Self { route, df }
    }

    /// Table with no rows
    pub fn empty(route: Route) -> Result<Self> {
        Self::from_observations(route, &[])
    }

    /// Build a table from `(date, value)` pairs in any order
    pub fn from_observations(route: Route, observations: &[(NaiveDate, f64)]) -> Result<Self> {
        let days: Vec<i32> = observations.iter().map(|(d, _)| date_to_days(*d)).collect();
        let values: Vec<f64> = observations.iter().map(|(_, v)| *v).collect();

        let date_series = Series::new(DATE_COLUMN, days).cast(&DataType::Date)?;
        let value_series = Series::new(VALUE_COLUMN, values);
        let df = DataFrame::new(vec![date_series, value_series])?;

        Ok(Self { route, df })
    }

    /// Load a table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(route: Route, path: P) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Ok(Self { route, df })
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Number of rows, including ones that will be dropped when read
    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Valid `(date, value)` pairs in table order.
    ///
    /// Rows with a null date or a null/non-finite value are dropped.
    pub fn observations(&self) -> Result<Vec<(NaiveDate, f64)>> {
        for required in [DATE_COLUMN, VALUE_COLUMN] {
            if self.df.column(required).is_err() {
                return Err(EcmError::ValidationError(format!(
                    "{} table is missing the '{}' column",
                    self.route, required
                )));
            }
        }

        let dates = date_column(self.df.column(DATE_COLUMN)?)?;
        let values = float_column(self.df.column(VALUE_COLUMN)?)?;

        Ok(dates
            .into_iter()
            .zip(values)
            .filter_map(|(d, v)| match (d, v) {
                (Some(d), Some(v)) if v.is_finite() => Some((d, v)),
                _ => None,
            })
            .collect())
    }
}

/// The three route tables feeding the aligner
#[derive(Debug, Clone)]
pub struct RouteSources {
    pub line1: RouteTable,
    pub line3: RouteTable,
    pub line13: RouteTable,
}

impl RouteSources {
    pub fn new(line1: RouteTable, line3: RouteTable, line13: RouteTable) -> Self {
        Self {
            line1,
            line3,
            line13,
        }
    }

    /// Split scraped records into route tables.
    ///
    /// Records for other segments or without a gas transit time are ignored.
    pub fn from_records(records: &[TransitRecord]) -> Result<Self> {
        let mut by_route: [Vec<(NaiveDate, f64)>; 3] = Default::default();
        for record in records {
            let (Some(route), Some(value)) = (record.route(), record.gas_transit_days()) else {
                continue;
            };
            let slot = match route {
                Route::Line1 => 0,
                Route::Line3 => 1,
                Route::Line13 => 2,
            };
            by_route[slot].push((record.date, value));
        }

        Ok(Self {
            line1: RouteTable::from_observations(Route::Line1, &by_route[0])?,
            line3: RouteTable::from_observations(Route::Line3, &by_route[1])?,
            line13: RouteTable::from_observations(Route::Line13, &by_route[2])?,
        })
    }

    /// Read a scraped CSV file and split it into route tables
    pub fn from_records_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_records(&read_transit_records(path)?)
    }
}

/// Whether a panel came from the inner join or from anchoring on L13
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKind {
    /// Every row has all three routes and the trend runs 1..N
    Aligned,
    /// Trend follows the L13 calendar. L1 and L3 may be missing, and the
    /// trend skips the weeks dropped by [`TimeSeriesPanel::complete_panel`].
    Anchored,
}

fn is_unit_trend(trend: &[u32]) -> bool {
    trend.iter().zip(1u32..).all(|(&t, expected)| t == expected)
}

/// Date-indexed panel of the three routes plus a trend counter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPanel {
    pub(crate) kind: PanelKind,
    pub(crate) dates: Vec<NaiveDate>,
    pub(crate) l1: Vec<Option<f64>>,
    pub(crate) l3: Vec<Option<f64>>,
    pub(crate) l13: Vec<f64>,
    pub(crate) trend: Vec<u32>,
    pub(crate) l1_observed: Vec<bool>,
    pub(crate) l3_observed: Vec<bool>,
}

impl TimeSeriesPanel {
    /// Panel where every row has all three routes; trend is numbered 1..N
    pub fn aligned(
        dates: Vec<NaiveDate>,
        l1: Vec<f64>,
        l3: Vec<f64>,
        l13: Vec<f64>,
    ) -> Result<Self> {
        let trend = (1..=dates.len() as u32).collect();
        Self::from_parts(
            PanelKind::Aligned,
            dates,
            l1.into_iter().map(Some).collect(),
            l3.into_iter().map(Some).collect(),
            l13,
            trend,
            None,
        )
    }

    /// Panel over the L13 dates with optional L1/L3 values.
    /// Observed flags follow the presence of each value.
    pub fn anchored(
        dates: Vec<NaiveDate>,
        l1: Vec<Option<f64>>,
        l3: Vec<Option<f64>>,
        l13: Vec<f64>,
    ) -> Result<Self> {
        let trend = (1..=dates.len() as u32).collect();
        Self::from_parts(PanelKind::Anchored, dates, l1, l3, l13, trend, None)
    }

    pub(crate) fn from_parts(
        kind: PanelKind,
        dates: Vec<NaiveDate>,
        l1: Vec<Option<f64>>,
        l3: Vec<Option<f64>>,
        l13: Vec<f64>,
        trend: Vec<u32>,
        observed: Option<(Vec<bool>, Vec<bool>)>,
    ) -> Result<Self> {
        let n = dates.len();
        if [l1.len(), l3.len(), l13.len(), trend.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(EcmError::ValidationError(
                "Panel columns must all have the same length".to_string(),
            ));
        }
        if let Some(pos) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EcmError::ValidationError(format!(
                "Panel dates must be strictly increasing (row {} is {})",
                pos + 1,
                dates[pos + 1]
            )));
        }
        if trend.windows(2).any(|w| w[1] <= w[0]) {
            return Err(EcmError::ValidationError(
                "Panel trend must be strictly increasing".to_string(),
            ));
        }
        if l13.iter().any(|v| !v.is_finite())
            || l1.iter().chain(&l3).flatten().any(|v| !v.is_finite())
        {
            return Err(EcmError::ValidationError(
                "Panel values must be finite".to_string(),
            ));
        }
        if kind == PanelKind::Aligned && l1.iter().chain(&l3).any(Option::is_none) {
            return Err(EcmError::ValidationError(
                "An aligned panel cannot have missing values".to_string(),
            ));
        }
        if kind == PanelKind::Aligned && !is_unit_trend(&trend) {
            return Err(EcmError::ValidationError(
                "An aligned panel must have trend 1..N".to_string(),
            ));
        }

        let (l1_observed, l3_observed) = match observed {
            Some((a, b)) if a.len() == n && b.len() == n => (a, b),
            Some(_) => {
                return Err(EcmError::ValidationError(
                    "Observed flags must match the panel length".to_string(),
                ))
            }
            None => (
                l1.iter().map(Option::is_some).collect(),
                l3.iter().map(Option::is_some).collect(),
            ),
        };

        Ok(Self {
            kind,
            dates,
            l1,
            l3,
            l13,
            trend,
            l1_observed,
            l3_observed,
        })
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn l1(&self) -> &[Option<f64>] {
        &self.l1
    }

    pub fn l3(&self) -> &[Option<f64>] {
        &self.l3
    }

    pub fn l13(&self) -> &[f64] {
        &self.l13
    }

    pub fn trend(&self) -> &[u32] {
        &self.trend
    }

    pub fn l1_observed(&self) -> &[bool] {
        &self.l1_observed
    }

    pub fn l3_observed(&self) -> &[bool] {
        &self.l3_observed
    }

    /// Rows where both L1 and L3 are present, keeping their trend values
    pub fn complete_levels(&self) -> LevelSeries {
        let mut levels = LevelSeries::default();
        for i in 0..self.len() {
            if let (Some(l1), Some(l3)) = (self.l1[i], self.l3[i]) {
                levels.dates.push(self.dates[i]);
                levels.l1.push(l1);
                levels.l3.push(l3);
                levels.l13.push(self.l13[i]);
                levels.trend.push(self.trend[i] as f64);
            }
        }
        levels
    }

    /// Panel made of the complete rows, keeping their trend numbers.
    ///
    /// The result is [`PanelKind::Aligned`] only when no row was dropped
    /// from a 1..N trend; otherwise it stays [`PanelKind::Anchored`] and the
    /// trend shows the skipped weeks.
    pub fn complete_panel(&self) -> Result<Self> {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.l1[i].is_some() && self.l3[i].is_some())
            .collect();
        let trend: Vec<u32> = keep.iter().map(|&i| self.trend[i]).collect();
        let kind = if is_unit_trend(&trend) {
            PanelKind::Aligned
        } else {
            PanelKind::Anchored
        };

        Self::from_parts(
            kind,
            keep.iter().map(|&i| self.dates[i]).collect(),
            keep.iter().map(|&i| self.l1[i]).collect(),
            keep.iter().map(|&i| self.l3[i]).collect(),
            keep.iter().map(|&i| self.l13[i]).collect(),
            trend,
            Some((
                keep.iter().map(|&i| self.l1_observed[i]).collect(),
                keep.iter().map(|&i| self.l3_observed[i]).collect(),
            )),
        )
    }

    /// Polars frame with columns Date, L1, L3, L13, trend, L1_observed, L3_observed
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self.dates.iter().map(|d| date_to_days(*d)).collect();

        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN, days).cast(&DataType::Date)?,
            Series::new("L1", &self.l1),
            Series::new("L3", &self.l3),
            Series::new("L13", &self.l13),
            Series::new("trend", &self.trend),
            Series::new("L1_observed", &self.l1_observed),
            Series::new("L3_observed", &self.l3_observed),
        ])?;

        Ok(df)
    }

    /// Rebuild a panel from a frame produced by [`to_dataframe`](Self::to_dataframe).
    ///
    /// `trend` and the observed flags are optional; a frame with any missing
    /// L1/L3 value or a gap in the trend becomes an anchored panel.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        for required in [DATE_COLUMN, "L1", "L3", "L13"] {
            if df.column(required).is_err() {
                return Err(EcmError::ValidationError(format!(
                    "Panel frame is missing the '{}' column",
                    required
                )));
            }
        }

        let dates = date_column(df.column(DATE_COLUMN)?)?
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| EcmError::ValidationError("Panel frame has null dates".to_string()))?;
        let l1 = float_column(df.column("L1")?)?;
        let l3 = float_column(df.column("L3")?)?;
        let l13 = float_column(df.column("L13")?)?
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| EcmError::ValidationError("L13 cannot have missing values".to_string()))?;

        let trend = match df.column("trend") {
            Ok(col) => col
                .cast(&DataType::UInt32)?
                .u32()?
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| EcmError::ValidationError("trend has null values".to_string()))?,
            Err(_) => (1..=dates.len() as u32).collect(),
        };

        let observed = match (df.column("L1_observed"), df.column("L3_observed")) {
            (Ok(a), Ok(b)) => Some((bool_column(a)?, bool_column(b)?)),
            _ => None,
        };

        let kind = if l1.iter().chain(&l3).all(Option::is_some) && is_unit_trend(&trend) {
            PanelKind::Aligned
        } else {
            PanelKind::Anchored
        };

        Self::from_parts(kind, dates, l1, l3, l13, trend, observed)
    }
}

/// Plain level vectors of the complete rows of a panel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelSeries {
    pub dates: Vec<NaiveDate>,
    pub l1: Vec<f64>,
    pub l3: Vec<f64>,
    pub l13: Vec<f64>,
    pub trend: Vec<f64>,
}

impl LevelSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The first `n` rows
    pub fn head(&self, n: usize) -> LevelSeries {
        let n = n.min(self.len());
        LevelSeries {
            dates: self.dates[..n].to_vec(),
            l1: self.l1[..n].to_vec(),
            l3: self.l3[..n].to_vec(),
            l13: self.l13[..n].to_vec(),
            trend: self.trend[..n].to_vec(),
        }
    }
}

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Dates from a `Date`, `Datetime` or ISO string column
fn date_column(series: &Series) -> Result<Vec<Option<NaiveDate>>> {
    match series.dtype() {
        DataType::Date => Ok(series
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|d| d.and_then(days_to_date))
            .collect()),
        DataType::Datetime(_, _) => date_column(&series.cast(&DataType::Date)?),
        DataType::Utf8 => series
            .utf8()?
            .into_iter()
            .map(|s| match s {
                None => Ok(None),
                Some(text) => parse_date(text).map(Some).ok_or_else(|| {
                    EcmError::DataError(format!("Unparseable date '{}' in '{}'", text, series.name()))
                }),
            })
            .collect(),
        other => Err(EcmError::DataError(format!(
            "Column '{}' has type {} and cannot hold dates",
            series.name(),
            other
        ))),
    }
}

fn float_column(series: &Series) -> Result<Vec<Option<f64>>> {
    Ok(series
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn bool_column(series: &Series) -> Result<Vec<bool>> {
    Ok(series
        .bool()?
        .into_iter()
        .map(|v| v.unwrap_or(false))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn test_route_codes() {
        assert_eq!(Route::from_locations("HTN", "GBJ"), Some(Route::Line1));
        assert_eq!(Route::from_locations("gbj", " htn"), Some(Route::Line3));
        assert_eq!(Route::from_locations("HTN", "LNJ"), Some(Route::Line13));
        assert_eq!(Route::from_locations("LNJ", "HTN"), None);
    }

    #[test]
    fn test_gas_transit_days() {
        let record = TransitRecord {
            date: day(1),
            from: "HTN".into(),
            to: "GBJ".into(),
            cycle: Some("12".into()),
            gas_days: Some(9.0),
            gas_hours: Some(6.0),
            distillates_days: None,
            distillates_hours: None,
        };
        assert_eq!(record.gas_transit_days(), Some(9.25));
        assert_eq!(record.route(), Some(Route::Line1));

        let missing = TransitRecord {
            gas_days: None,
            ..record
        };
        assert_eq!(missing.gas_transit_days(), None);
    }

    #[test]
    fn test_route_table_drops_invalid_rows() {
        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN, &[Some("2023-01-02"), None, Some("2023-01-01 08:00:00")]),
            Series::new(VALUE_COLUMN, &[Some(10.5), Some(3.0), Some(f64::NAN)]),
        ])
        .unwrap();
        let table = RouteTable::new(Route::Line1, df);

        assert_eq!(table.observations().unwrap(), vec![(day(2), 10.5)]);
    }

    #[test]
    fn test_route_table_missing_column() {
        let df = DataFrame::new(vec![Series::new(DATE_COLUMN, &["2023-01-01"])]).unwrap();
        let err = RouteTable::new(Route::Line3, df).observations().unwrap_err();
        assert!(matches!(err, EcmError::ValidationError(_)));
    }

    #[test]
    fn test_panel_rejects_unsorted_dates() {
        let result = TimeSeriesPanel::aligned(
            vec![day(2), day(1)],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_panel_dataframe_conversion() {
        let panel = TimeSeriesPanel::anchored(
            vec![day(1), day(2), day(3)],
            vec![Some(9.0), None, Some(9.5)],
            vec![None, Some(12.0), Some(12.5)],
            vec![10.0, 10.2, 10.4],
        )
        .unwrap();

        let df = panel.to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        let restored = TimeSeriesPanel::from_dataframe(&df).unwrap();
        assert_eq!(restored, panel);

        let complete = panel.complete_panel().unwrap();
        assert_eq!(complete.len(), 1);
        assert_eq!(complete.trend(), &[3]);
        assert_eq!(complete.kind(), PanelKind::Anchored);

        let restored = TimeSeriesPanel::from_dataframe(&complete.to_dataframe().unwrap()).unwrap();
        assert_eq!(restored.kind(), PanelKind::Anchored);
    }

    #[test]
    fn test_complete_panel_kind_follows_trend() {
        let leading_gap = TimeSeriesPanel::anchored(
            vec![day(1), day(2), day(3)],
            vec![None, Some(9.0), Some(9.5)],
            vec![Some(12.0), Some(12.2), Some(12.5)],
            vec![10.0, 10.2, 10.4],
        )
        .unwrap();
        let complete = leading_gap.complete_panel().unwrap();
        assert_eq!(complete.trend(), &[2, 3]);
        assert_eq!(complete.kind(), PanelKind::Anchored);

        let trailing_gap = TimeSeriesPanel::anchored(
            vec![day(1), day(2), day(3)],
            vec![Some(9.0), Some(9.2), None],
            vec![Some(12.0), Some(12.2), Some(12.5)],
            vec![10.0, 10.2, 10.4],
        )
        .unwrap();
        let complete = trailing_gap.complete_panel().unwrap();
        assert_eq!(complete.trend(), &[1, 2]);
        assert_eq!(complete.kind(), PanelKind::Aligned);
    }

    #[test]
    fn test_aligned_panel_rejects_trend_gaps() {
        let result = TimeSeriesPanel::from_parts(
            PanelKind::Aligned,
            vec![day(1), day(3)],
            vec![Some(9.0), Some(9.5)],
            vec![Some(12.0), Some(12.5)],
            vec![10.0, 10.4],
            vec![1, 3],
            None,
        );
        assert!(matches!(result, Err(EcmError::ValidationError(_))));
    }
}
