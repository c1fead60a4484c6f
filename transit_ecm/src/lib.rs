//! # Transit ECM
//!
//! Econometric forecasting of pipeline transit times. Weekly gas transit
//! days on Line 1 are modelled against Line 13 (the anchor route) and Line 3
//! with an Engle-Granger error correction model, then compared with
//! persistence baselines in a rolling-origin backtest.
//!
//! ## Stages
//!
//! - [`align`]: join the three routes into one weekly panel, or anchor on
//!   Line 13 and impute missing Line 1 values
//! - [`cointegration`]: long-run regression `L1 ~ const + L13 + trend`
//! - [`ecm`]: lag search over `(p, q, r)` and the final short-run fit
//! - [`forecast`]: recursive 1-4 step forecasts at rolling origins
//! - [`metrics`]: RMSE, MAE and MAPE per model and horizon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transit_ecm::align::align;
//! use transit_ecm::cointegration::estimate_cointegration;
//! use transit_ecm::config::{AlignMode, EcmOptions, ForecastOptions};
//! use transit_ecm::data::RouteSources;
//! use transit_ecm::ecm::build_ecm;
//! use transit_ecm::forecast::evaluate_forecasts;
//!
//! # fn main() -> transit_ecm::Result<()> {
//! let sources = RouteSources::from_records_csv("transit.csv")?;
//! let panel = align(&sources, AlignMode::InnerJoin)?;
//!
//! let cointegration = estimate_cointegration(&panel)?;
//! let ecm = build_ecm(&panel, &cointegration, &EcmOptions::default())?;
//! println!("{}", ecm.description());
//!
//! let evaluation = evaluate_forecasts(
//!     &panel,
//!     &cointegration,
//!     &ecm.specification,
//!     &ForecastOptions::default(),
//! )?;
//! for best in &evaluation.best_by_horizon {
//!     println!("h={}: {} (RMSE {:.3})", best.horizon, best.model, best.rmse);
//! }
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod cointegration;
pub mod config;
pub mod data;
pub mod ecm;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod synthetic;

// Re-export commonly used types
pub use crate::cointegration::{CointegrationCoefficients, CointegrationResult};
pub use crate::config::{AlignMode, EcmOptions, ExogNowcast, ForecastOptions, PipelineConfig, ResidualMode};
pub use crate::data::{Route, RouteSources, RouteTable, TimeSeriesPanel, TransitRecord};
pub use crate::ecm::{EcmFit, EcmSpecification};
pub use crate::error::{EcmError, Result};
pub use crate::forecast::{ForecastEvaluation, ForecastRecord};
pub use crate::metrics::MetricRow;
pub use crate::models::{ForecastModel, ForecastResult, ModelKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
