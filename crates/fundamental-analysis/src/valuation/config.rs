use std::collections::HashMap;

use analysis_core::config::{env_or, load_dotenv};
use analysis_core::AnalysisError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::dcf::{DEFAULT_EQUITY_RISK_PREMIUM, DEFAULT_TERMINAL_GROWTH, TERMINAL_FALLBACK_MULTIPLE};
use super::models::{ScenarioName, ScenarioParams};

/// Valuation policy. `Default` reproduces the standard engine constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationConfig {
    pub equity_risk_premium: f64,
    pub terminal_growth: f64,
    pub terminal_fallback_multiple: f64,
    /// Margin of safety (percent) at or above which a stock is undervalued.
    pub undervalued_threshold: f64,
    /// Margin of safety (percent) at or above which a stock is fairly valued.
    pub fairly_valued_threshold: f64,
    pub scenarios: Vec<ScenarioParams>,
    /// Lower-cased sector name -> beta.
    pub sector_betas: HashMap<String, f64>,
    /// Lower-cased country name or ISO code -> corporate tax rate.
    pub country_tax_rates: HashMap<String, f64>,
    pub default_beta: f64,
    pub default_tax_rate: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            equity_risk_premium: DEFAULT_EQUITY_RISK_PREMIUM,
            terminal_growth: DEFAULT_TERMINAL_GROWTH,
            terminal_fallback_multiple: TERMINAL_FALLBACK_MULTIPLE,
            undervalued_threshold: 15.0,
            fairly_valued_threshold: -10.0,
            scenarios: default_scenarios(),
            sector_betas: default_sector_betas(),
            country_tax_rates: default_country_tax_rates(),
            default_beta: 1.0,
            default_tax_rate: 0.25,
        }
    }
}

impl ValuationConfig {
    /// Defaults overlaid with `VALUATION_*` environment variables.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        let defaults = Self::default();
        let config = Self {
            equity_risk_premium: env_or(
                "VALUATION_EQUITY_RISK_PREMIUM",
                defaults.equity_risk_premium,
            )?,
            terminal_growth: env_or("VALUATION_TERMINAL_GROWTH", defaults.terminal_growth)?,
            terminal_fallback_multiple: env_or(
                "VALUATION_TERMINAL_FALLBACK_MULTIPLE",
                defaults.terminal_fallback_multiple,
            )?,
            default_beta: env_or("VALUATION_DEFAULT_BETA", defaults.default_beta)?,
            default_tax_rate: env_or("VALUATION_DEFAULT_TAX_RATE", defaults.default_tax_rate)?,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let finite = [
            ("equity_risk_premium", self.equity_risk_premium),
            ("terminal_growth", self.terminal_growth),
            ("terminal_fallback_multiple", self.terminal_fallback_multiple),
            ("undervalued_threshold", self.undervalued_threshold),
            ("fairly_valued_threshold", self.fairly_valued_threshold),
            ("default_beta", self.default_beta),
            ("default_tax_rate", self.default_tax_rate),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidConfig(format!("{} must be finite", name)));
            }
        }
        if self.undervalued_threshold < self.fairly_valued_threshold {
            return Err(AnalysisError::InvalidConfig(
                "undervalued_threshold must not be below fairly_valued_threshold".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.default_tax_rate) {
            return Err(AnalysisError::InvalidConfig(
                "default_tax_rate must be in [0, 1)".to_string(),
            ));
        }
        if self.terminal_fallback_multiple <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "terminal_fallback_multiple must be positive".to_string(),
            ));
        }
        for params in &self.scenarios {
            if !(params.price_multiplier.is_finite() && params.price_multiplier >= 0.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{:?} scenario has an invalid price multiplier",
                    params.name
                )));
            }
        }
        Ok(())
    }
}

fn default_scenarios() -> Vec<ScenarioParams> {
    vec![
        ScenarioParams {
            name: ScenarioName::Bear,
            price_multiplier: 0.65,
            wacc_shift: 0.015,
            wacc_floor: None,
            terminal_growth: 0.015,
        },
        ScenarioParams {
            name: ScenarioName::Base,
            price_multiplier: 1.0,
            wacc_shift: 0.0,
            wacc_floor: None,
            terminal_growth: 0.025,
        },
        ScenarioParams {
            name: ScenarioName::Bull,
            price_multiplier: 1.25,
            wacc_shift: -0.01,
            wacc_floor: Some(0.05),
            terminal_growth: 0.035,
        },
    ]
}

fn default_sector_betas() -> HashMap<String, f64> {
    [
        ("technology", 1.25),
        ("information technology", 1.25),
        ("communication services", 1.05),
        ("telecommunication services", 0.8),
        ("consumer cyclical", 1.15),
        ("consumer discretionary", 1.15),
        ("consumer defensive", 0.7),
        ("consumer staples", 0.7),
        ("healthcare", 0.9),
        ("health care", 0.9),
        ("financial services", 1.1),
        ("financials", 1.1),
        ("industrials", 1.05),
        ("energy", 1.1),
        ("basic materials", 1.05),
        ("materials", 1.05),
        ("real estate", 0.85),
        ("utilities", 0.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_country_tax_rates() -> HashMap<String, f64> {
    [
        ("us", 0.21),
        ("usa", 0.21),
        ("united states", 0.21),
        ("gb", 0.25),
        ("uk", 0.25),
        ("united kingdom", 0.25),
        ("de", 0.30),
        ("germany", 0.30),
        ("fr", 0.25),
        ("france", 0.25),
        ("nl", 0.258),
        ("netherlands", 0.258),
        ("ie", 0.125),
        ("ireland", 0.125),
        ("ch", 0.15),
        ("switzerland", 0.15),
        ("ca", 0.265),
        ("canada", 0.265),
        ("jp", 0.30),
        ("japan", 0.30),
        ("cn", 0.25),
        ("china", 0.25),
        ("hk", 0.165),
        ("hong kong", 0.165),
        ("sg", 0.17),
        ("singapore", 0.17),
        ("in", 0.25),
        ("india", 0.25),
        ("au", 0.30),
        ("australia", 0.30),
        ("kr", 0.24),
        ("south korea", 0.24),
        ("tw", 0.20),
        ("taiwan", 0.20),
        ("br", 0.34),
        ("brazil", 0.34),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
