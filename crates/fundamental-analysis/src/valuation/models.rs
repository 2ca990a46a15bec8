use serde::{Deserialize, Serialize};

use super::dcf::WaccInputs;

/// Valuation verdict derived from the margin of safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Undervalued,
    FairlyValued,
    Overvalued,
}

impl Verdict {
    pub fn to_label(&self) -> &'static str {
        match self {
            Verdict::Undervalued => "Undervalued",
            Verdict::FairlyValued => "Fairly Valued",
            Verdict::Overvalued => "Overvalued",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioName {
    Bear,
    Base,
    Bull,
}

/// One row of the scenario table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParams {
    pub name: ScenarioName,
    /// Applied to the supplied intrinsic value to get the target price.
    pub price_multiplier: f64,
    /// Added to the base WACC (fraction, +0.015 = +1.5pp).
    pub wacc_shift: f64,
    /// Lower bound on the shifted WACC, if any.
    pub wacc_floor: Option<f64>,
    pub terminal_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfScenario {
    pub name: ScenarioName,
    pub wacc: f64,
    pub terminal_growth: f64,
    pub target_price: f64,
    pub margin_of_safety: f64,
}

/// WACC inputs as they typically arrive from a provider: some fields missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialWaccInputs {
    pub risk_free_rate: f64,
    pub beta: Option<f64>,
    pub sector: Option<String>,
    pub equity_risk_premium: Option<f64>,
    pub cost_of_debt: f64,
    pub tax_rate: Option<f64>,
    pub country: Option<String>,
    pub debt_to_equity: f64,
}

/// Everything needed to value one investment thesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisInputs {
    pub current_price: f64,
    pub wacc_inputs: WaccInputs,
    /// Explicit forecast, year 1 first.
    #[serde(default)]
    pub projected_fcfs: Vec<f64>,
    #[serde(default)]
    pub shares_outstanding: f64,
    /// Defaults to the configured terminal growth.
    #[serde(default)]
    pub terminal_growth: Option<f64>,
    /// Intrinsic value per share from an external DCF provider. When present
    /// and positive it is used instead of the locally computed value.
    #[serde(default)]
    pub external_intrinsic_value: Option<f64>,
}

/// Aggregate valuation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisValuation {
    pub current_price: f64,
    pub intrinsic_value: f64,
    pub margin_of_safety: f64,
    pub verdict: Verdict,
    pub wacc: f64,
    pub cost_of_equity: f64,
    /// Pre-tax cost of debt, as supplied in the WACC inputs.
    pub cost_of_debt: f64,
    /// `cost_of_debt * (1 - tax_rate)`, the rate the WACC actually uses.
    pub after_tax_cost_of_debt: f64,
    pub terminal_value: f64,
    pub scenarios: Vec<DcfScenario>,
}
