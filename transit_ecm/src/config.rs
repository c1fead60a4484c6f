//! Options for each pipeline stage, loadable from JSON

use crate::error::{EcmError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use transit_math::InformationCriterion;

/// How the three route tables are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignMode {
    /// Keep only dates present in all three routes
    #[default]
    InnerJoin,
    /// Keep every L13 date and flag missing L1/L3 values
    Anchor,
}

/// Residual adjustment added to imputed L1 values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualMode {
    #[default]
    Zero,
    /// Mean of the cointegration residuals
    Mean,
    /// Independent draw with replacement from the residuals, per missing row
    Sampled,
}

/// Policy for filling contemporaneous exogenous differences at horizon 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExogNowcast {
    /// Mean of the last `lookback` first differences
    MovingAverage { lookback: usize },
    /// Lag-1 autocorrelation of the differences times the last difference
    Ar1,
}

impl Default for ExogNowcast {
    fn default() -> Self {
        ExogNowcast::MovingAverage { lookback: 3 }
    }
}

impl std::fmt::Display for ExogNowcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExogNowcast::MovingAverage { lookback } => write!(f, "MA({})", lookback),
            ExogNowcast::Ar1 => write!(f, "AR(1)"),
        }
    }
}

/// Lag search and final fit settings for the error correction model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcmOptions {
    /// Newey-West lag window; chosen from the sample size when `None`
    pub hac_max_lags: Option<usize>,
    /// Allow lag-0 ΔL13/ΔL3 regressors
    pub allow_contemporaneous: bool,
    pub ic_kind: InformationCriterion,
    /// Include ΔL3 terms in the short-run equation
    pub include_third_series: bool,
    /// Upper bound on p, q and r
    pub max_lag_cap: usize,
}

impl Default for EcmOptions {
    fn default() -> Self {
        Self {
            hac_max_lags: None,
            allow_contemporaneous: false,
            ic_kind: InformationCriterion::Bic,
            include_third_series: true,
            max_lag_cap: 3,
        }
    }
}

impl EcmOptions {
    /// Check that the options describe a searchable grid
    pub fn validate(&self) -> Result<()> {
        if self.max_lag_cap == 0 {
            return Err(EcmError::ConfigError(
                "max_lag_cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_ic_kind(mut self, ic_kind: InformationCriterion) -> Self {
        self.ic_kind = ic_kind;
        self
    }

    pub fn with_contemporaneous(mut self, allow: bool) -> Self {
        self.allow_contemporaneous = allow;
        self
    }

    pub fn with_third_series(mut self, include: bool) -> Self {
        self.include_third_series = include;
        self
    }

    pub fn with_max_lag_cap(mut self, cap: usize) -> Self {
        self.max_lag_cap = cap;
        self
    }

    pub fn with_hac_max_lags(mut self, lags: Option<usize>) -> Self {
        self.hac_max_lags = lags;
        self
    }
}

/// Rolling-origin backtest settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastOptions {
    /// Number of held-out observations at the end of the panel
    pub n_test: usize,
    pub exog_nowcast: ExogNowcast,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            n_test: 26,
            exog_nowcast: ExogNowcast::default(),
        }
    }
}

impl ForecastOptions {
    /// Create options, rejecting a test window that leaves no full-horizon origin
    pub fn new(n_test: usize, exog_nowcast: ExogNowcast) -> Result<Self> {
        let options = Self {
            n_test,
            exog_nowcast,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_test < crate::forecast::MAX_HORIZON {
            return Err(EcmError::ConfigError(format!(
                "n_test must be at least {}, got {}",
                crate::forecast::MAX_HORIZON,
                self.n_test
            )));
        }
        if let ExogNowcast::MovingAverage { lookback: 0 } = self.exog_nowcast {
            return Err(EcmError::ConfigError(
                "Moving-average nowcast lookback must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for a full pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub align_mode: AlignMode,
    /// Only used in anchor mode
    pub residual_mode: ResidualMode,
    /// Seed for sampled residuals; the thread RNG is used when absent
    pub seed: Option<u64>,
    pub ecm: EcmOptions,
    pub forecast: ForecastOptions,
}

impl PipelineConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.ecm.validate()?;
        self.forecast.validate()
    }
}
