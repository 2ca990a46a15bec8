use std::fmt;
use std::str::FromStr;

use analysis_core::config::{env_or, load_dotenv};
use analysis_core::AnalysisError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// How `vsBenchmark.beta` is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetaMethod {
    /// Always report `fixed_beta`.
    #[default]
    Fixed,
    /// Covariance of pick returns against the benchmark over each holding window.
    Covariance,
}

impl FromStr for BetaMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(BetaMethod::Fixed),
            "covariance" => Ok(BetaMethod::Covariance),
            other => Err(AnalysisError::InvalidConfig(format!("unknown beta method: {}", other))),
        }
    }
}

impl fmt::Display for BetaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetaMethod::Fixed => write!(f, "fixed"),
            BetaMethod::Covariance => write!(f, "covariance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestConfig {
    /// Annual risk-free rate in percent, subtracted in the Sharpe numerator.
    pub risk_free_rate: f64,
    pub days_per_year: f64,
    pub default_hold_period_days: i64,
    pub beta_method: BetaMethod,
    pub fixed_beta: f64,
    pub min_beta_observations: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 2.0,
            days_per_year: 365.25,
            default_hold_period_days: 30,
            beta_method: BetaMethod::Fixed,
            fixed_beta: 1.0,
            min_beta_observations: 3,
        }
    }
}

impl BacktestConfig {
    /// Defaults overlaid with `BACKTEST_*` environment variables.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        let defaults = Self::default();
        let config = Self {
            risk_free_rate: env_or("BACKTEST_RISK_FREE_RATE", defaults.risk_free_rate)?,
            default_hold_period_days: env_or(
                "BACKTEST_HOLD_PERIOD_DAYS",
                defaults.default_hold_period_days,
            )?,
            beta_method: env_or("BACKTEST_BETA_METHOD", defaults.beta_method)?,
            min_beta_observations: env_or(
                "BACKTEST_MIN_BETA_OBSERVATIONS",
                defaults.min_beta_observations,
            )?,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.risk_free_rate.is_finite() {
            return Err(AnalysisError::InvalidConfig("risk_free_rate must be finite".to_string()));
        }
        if !(self.days_per_year.is_finite() && self.days_per_year > 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "days_per_year must be positive".to_string(),
            ));
        }
        if self.default_hold_period_days < 0 {
            return Err(AnalysisError::InvalidConfig(
                "default_hold_period_days must not be negative".to_string(),
            ));
        }
        if !self.fixed_beta.is_finite() {
            return Err(AnalysisError::InvalidConfig("fixed_beta must be finite".to_string()));
        }
        if self.min_beta_observations < 2 {
            return Err(AnalysisError::InvalidConfig(
                "min_beta_observations must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
