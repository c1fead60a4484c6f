//! # Transit Implied
//!
//! `transit_implied` runs the whole transit-time workflow in one call:
//! alignment, the long-run cointegrating regression, the error correction
//! model and the rolling forecast backtest, followed by a summary of the
//! numbers worth reporting.
//!
//! ## Example
//!
//! ```
//! use transit_implied::{run_pipeline, PipelineConfig};
//! use transit_implied::transit_ecm::synthetic::cointegrated_routes;
//!
//! let sources = cointegrated_routes(120, 7).unwrap();
//! let report = run_pipeline(&sources, &PipelineConfig::default()).unwrap();
//!
//! assert_eq!(report.key_metrics.horizons.len(), 4);
//! assert!(report.key_metrics.gamma.is_finite());
//! ```
//!
//! Nothing is printed. Progress is reported through `tracing` events, so
//! install a subscriber to see it.

pub mod pipeline;

pub use pipeline::{run_pipeline, HorizonSummary, KeyMetrics, PipelineReport};
pub use transit_ecm;
pub use transit_ecm::{EcmError, PipelineConfig, Result, RouteSources};
pub use transit_math;
