use super::config::ValuationConfig;
use super::dcf::{self, WaccBreakdown, WaccInputs};
use super::estimators;
use super::models::*;

/// DCF / WACC valuation engine.
///
/// Stateless apart from its immutable policy; every method is a pure
/// function of its arguments and the config.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    config: ValuationConfig,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self {
            config: ValuationConfig::default(),
        }
    }

    pub fn with_config(config: ValuationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// CAPM with the configured equity risk premium.
    pub fn cost_of_equity(&self, risk_free_rate: f64, beta: f64) -> f64 {
        dcf::cost_of_equity(risk_free_rate, beta, self.config.equity_risk_premium)
    }

    pub fn wacc(&self, inputs: &WaccInputs) -> f64 {
        dcf::wacc(inputs)
    }

    pub fn wacc_breakdown(&self, inputs: &WaccInputs) -> WaccBreakdown {
        dcf::wacc_breakdown(inputs)
    }

    /// Gordon Growth terminal value; `growth` defaults to the configured rate.
    pub fn terminal_value(&self, last_fcf: f64, wacc: f64, growth: Option<f64>) -> f64 {
        dcf::terminal_value(
            last_fcf,
            wacc,
            growth.unwrap_or(self.config.terminal_growth),
            self.config.terminal_fallback_multiple,
        )
    }

    pub fn intrinsic_value_per_share(
        &self,
        projected_fcfs: &[f64],
        wacc: f64,
        terminal_value: f64,
        shares_outstanding: f64,
    ) -> f64 {
        dcf::intrinsic_value_per_share(projected_fcfs, wacc, terminal_value, shares_outstanding)
    }

    pub fn margin_of_safety(&self, price: f64, intrinsic: f64) -> f64 {
        dcf::margin_of_safety(price, intrinsic)
    }

    /// Band lookup; each band includes its lower bound.
    pub fn verdict(&self, margin_of_safety: f64) -> Verdict {
        if margin_of_safety >= self.config.undervalued_threshold {
            Verdict::Undervalued
        } else if margin_of_safety >= self.config.fairly_valued_threshold {
            Verdict::FairlyValued
        } else {
            Verdict::Overvalued
        }
    }

    /// Bear/base/bull scenarios scaled from an already-computed intrinsic value.
    ///
    /// The intrinsic value is not recomputed: each scenario's target price is
    /// `intrinsic * multiplier`, and its margin of safety is measured against
    /// `current_price`.
    pub fn scenarios(
        &self,
        intrinsic_value: f64,
        current_price: f64,
        base_wacc: f64,
    ) -> Vec<DcfScenario> {
        self.config
            .scenarios
            .iter()
            .map(|params| {
                let shifted = base_wacc + params.wacc_shift;
                let wacc = match params.wacc_floor {
                    Some(floor) => shifted.max(floor),
                    None => shifted,
                };
                let target_price = intrinsic_value * params.price_multiplier;
                DcfScenario {
                    name: params.name,
                    wacc,
                    terminal_growth: params.terminal_growth,
                    target_price,
                    margin_of_safety: dcf::margin_of_safety(current_price, target_price),
                }
            })
            .collect()
    }

    pub fn estimate_beta(&self, sector: &str) -> f64 {
        estimators::estimate_beta(&self.config.sector_betas, sector, self.config.default_beta)
    }

    pub fn estimate_tax_rate(&self, country: &str) -> f64 {
        estimators::estimate_tax_rate(
            &self.config.country_tax_rates,
            country,
            self.config.default_tax_rate,
        )
    }

    /// Complete partially-known WACC inputs with the fallback estimators.
    pub fn estimate_wacc_inputs(&self, partial: &PartialWaccInputs) -> WaccInputs {
        let beta = partial
            .beta
            .filter(|b| b.is_finite())
            .unwrap_or_else(|| match &partial.sector {
                Some(sector) => self.estimate_beta(sector),
                None => self.config.default_beta,
            });
        let tax_rate = partial
            .tax_rate
            .filter(|t| t.is_finite())
            .unwrap_or_else(|| match &partial.country {
                Some(country) => self.estimate_tax_rate(country),
                None => self.config.default_tax_rate,
            });

        WaccInputs {
            risk_free_rate: partial.risk_free_rate,
            beta,
            equity_risk_premium: partial
                .equity_risk_premium
                .filter(|e| e.is_finite())
                .unwrap_or(self.config.equity_risk_premium),
            cost_of_debt: partial.cost_of_debt,
            tax_rate,
            debt_to_equity: partial.debt_to_equity.max(0.0),
        }
    }

    /// Full thesis valuation: WACC, terminal value, intrinsic value, verdict
    /// and scenarios.
    pub fn value_thesis(&self, inputs: &ThesisInputs) -> ThesisValuation {
        let breakdown = dcf::wacc_breakdown(&inputs.wacc_inputs);
        let wacc = breakdown.wacc;
        let growth = inputs.terminal_growth.unwrap_or(self.config.terminal_growth);

        let terminal_value = inputs
            .projected_fcfs
            .last()
            .map(|last| self.terminal_value(*last, wacc, Some(growth)))
            .unwrap_or(0.0);

        let dcf_value = dcf::intrinsic_value_per_share(
            &inputs.projected_fcfs,
            wacc,
            terminal_value,
            inputs.shares_outstanding,
        );
        let intrinsic_value = match inputs.external_intrinsic_value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => dcf_value,
        };

        let margin_of_safety = dcf::margin_of_safety(inputs.current_price, intrinsic_value);
        let verdict = self.verdict(margin_of_safety);
        let scenarios = self.scenarios(intrinsic_value, inputs.current_price, wacc);

        tracing::info!(
            "Thesis valuation: price {:.2}, intrinsic {:.2}, MoS {:.1}% ({}), WACC {:.2}%",
            inputs.current_price,
            intrinsic_value,
            margin_of_safety,
            verdict.to_label(),
            wacc * 100.0
        );

        ThesisValuation {
            current_price: inputs.current_price,
            intrinsic_value,
            margin_of_safety,
            verdict,
            wacc,
            cost_of_equity: breakdown.cost_of_equity,
            cost_of_debt: inputs.wacc_inputs.cost_of_debt,
            after_tax_cost_of_debt: breakdown.after_tax_cost_of_debt,
            terminal_value,
            scenarios,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> WaccInputs {
        WaccInputs {
            risk_free_rate: 0.04,
            beta: 1.2,
            equity_risk_premium: 0.055,
            cost_of_debt: 0.05,
            tax_rate: 0.21,
            debt_to_equity: 0.5,
        }
    }

    #[test]
    fn test_verdict_band_boundaries() {
        let engine = ValuationEngine::new();
        assert_eq!(engine.verdict(15.0), Verdict::Undervalued);
        assert_eq!(engine.verdict(14.999), Verdict::FairlyValued);
        assert_eq!(engine.verdict(-10.0), Verdict::FairlyValued);
        assert_eq!(engine.verdict(-10.001), Verdict::Overvalued);
        assert_eq!(engine.verdict(80.0), Verdict::Undervalued);
    }

    #[test]
    fn test_verdict_serializes_screaming_case() {
        let json = serde_json::to_string(&Verdict::FairlyValued).unwrap();
        assert_eq!(json, "\"FAIRLY_VALUED\"");
    }

    #[test]
    fn test_cost_of_equity_uses_default_premium() {
        let engine = ValuationEngine::new();
        assert!((engine.cost_of_equity(0.04, 1.2) - 0.106).abs() < 1e-12);
    }

    #[test]
    fn test_scenario_targets_are_exact_multiples() {
        let engine = ValuationEngine::new();
        let cases = [(150.0, 120.0, 0.09), (37.5, 60.0, 0.055), (1.0, 1.0, 0.2)];
        for (intrinsic, price, wacc) in cases {
            let s = engine.scenarios(intrinsic, price, wacc);
            assert_eq!(s.len(), 3);
            assert_eq!(s[0].name, ScenarioName::Bear);
            assert_eq!(s[0].target_price, intrinsic * 0.65);
            assert_eq!(s[1].name, ScenarioName::Base);
            assert_eq!(s[1].target_price, intrinsic * 1.0);
            assert_eq!(s[2].name, ScenarioName::Bull);
            assert_eq!(s[2].target_price, intrinsic * 1.25);
        }
    }

    #[test]
    fn test_scenario_wacc_and_growth() {
        let engine = ValuationEngine::new();
        let s = engine.scenarios(100.0, 80.0, 0.09);
        assert!((s[0].wacc - 0.105).abs() < 1e-12);
        assert!((s[1].wacc - 0.09).abs() < 1e-12);
        assert!((s[2].wacc - 0.08).abs() < 1e-12);
        assert_eq!(s[0].terminal_growth, 0.015);
        assert_eq!(s[1].terminal_growth, 0.025);
        assert_eq!(s[2].terminal_growth, 0.035);

        // Bull WACC is floored at 5%
        let s = engine.scenarios(100.0, 80.0, 0.055);
        assert!((s[2].wacc - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_scenario_margins_are_independent() {
        let engine = ValuationEngine::new();
        let s = engine.scenarios(100.0, 100.0, 0.09);
        assert!((s[0].margin_of_safety - (65.0 - 100.0) / 65.0 * 100.0).abs() < 1e-9);
        assert_eq!(s[1].margin_of_safety, 0.0);
        assert!((s[2].margin_of_safety - 20.0).abs() < 1e-9);

        // Zero intrinsic never yields NaN
        let s = engine.scenarios(0.0, 100.0, 0.09);
        assert!(s.iter().all(|x| x.margin_of_safety == 0.0));
    }

    #[test]
    fn test_estimate_wacc_inputs_fills_gaps() {
        let engine = ValuationEngine::new();
        let partial = PartialWaccInputs {
            risk_free_rate: 0.045,
            beta: None,
            sector: Some("Utilities".to_string()),
            equity_risk_premium: None,
            cost_of_debt: 0.06,
            tax_rate: None,
            country: Some("Atlantis".to_string()),
            debt_to_equity: -0.3,
        };
        let filled = engine.estimate_wacc_inputs(&partial);
        assert_eq!(filled.beta, 0.5);
        assert_eq!(filled.tax_rate, 0.25);
        assert_eq!(filled.equity_risk_premium, 0.055);
        assert_eq!(filled.debt_to_equity, 0.0);

        let partial = PartialWaccInputs {
            beta: Some(1.4),
            tax_rate: Some(0.19),
            ..partial
        };
        let filled = engine.estimate_wacc_inputs(&partial);
        assert_eq!(filled.beta, 1.4);
        assert_eq!(filled.tax_rate, 0.19);
    }

    #[test]
    fn test_value_thesis_from_local_dcf() {
        let engine = ValuationEngine::new();
        let fcfs = dcf::project_fcfs(1_000.0, 0.05, 5);
        let thesis = ThesisInputs {
            current_price: 10.0,
            wacc_inputs: inputs(),
            projected_fcfs: fcfs.clone(),
            shares_outstanding: 1_000.0,
            terminal_growth: None,
            external_intrinsic_value: None,
        };
        let v = engine.value_thesis(&thesis);

        let wacc = dcf::wacc(&inputs());
        let tv = dcf::terminal_value(fcfs[4], wacc, 0.025, 15.0);
        let expected = dcf::intrinsic_value_per_share(&fcfs, wacc, tv, 1_000.0);
        assert!((v.wacc - wacc).abs() < 1e-12);
        assert!((v.terminal_value - tv).abs() < 1e-9);
        assert!((v.intrinsic_value - expected).abs() < 1e-9);
        assert!((v.cost_of_equity - 0.106).abs() < 1e-12);
        assert_eq!(v.cost_of_debt, 0.05);
        assert!((v.after_tax_cost_of_debt - 0.0395).abs() < 1e-12);
        assert!(v.intrinsic_value > v.current_price);
        assert_eq!(v.verdict, Verdict::Undervalued);
        assert_eq!(v.scenarios.len(), 3);
        assert_eq!(v.scenarios[1].target_price, v.intrinsic_value);
    }

    #[test]
    fn test_value_thesis_prefers_external_intrinsic() {
        let engine = ValuationEngine::new();
        let thesis = ThesisInputs {
            current_price: 100.0,
            wacc_inputs: inputs(),
            projected_fcfs: vec![10.0, 11.0],
            shares_outstanding: 1.0,
            terminal_growth: Some(0.02),
            external_intrinsic_value: Some(120.0),
        };
        let v = engine.value_thesis(&thesis);
        assert_eq!(v.intrinsic_value, 120.0);
        assert!((v.margin_of_safety - 16.666_666).abs() < 1e-3);
        assert_eq!(v.verdict, Verdict::Undervalued);
        assert_eq!(v.scenarios[0].target_price, 120.0 * 0.65);
    }

    #[test]
    fn test_value_thesis_degrades_without_data() {
        let engine = ValuationEngine::new();
        let thesis = ThesisInputs {
            current_price: 50.0,
            wacc_inputs: inputs(),
            projected_fcfs: Vec::new(),
            shares_outstanding: 0.0,
            terminal_growth: None,
            external_intrinsic_value: Some(-5.0),
        };
        let v = engine.value_thesis(&thesis);
        assert_eq!(v.intrinsic_value, 0.0);
        assert_eq!(v.terminal_value, 0.0);
        assert_eq!(v.margin_of_safety, 0.0);
        assert_eq!(v.verdict, Verdict::FairlyValued);
        assert!(v.scenarios.iter().all(|s| s.margin_of_safety.is_finite()));
    }

    #[test]
    fn test_value_thesis_non_finite_wacc_stays_finite() {
        let engine = ValuationEngine::new();
        let thesis = ThesisInputs {
            current_price: 40.0,
            wacc_inputs: WaccInputs { beta: f64::NAN, ..inputs() },
            projected_fcfs: vec![8.0, 9.0],
            shares_outstanding: 1.0,
            terminal_growth: None,
            external_intrinsic_value: None,
        };
        let v = engine.value_thesis(&thesis);
        assert_eq!(v.terminal_value, 9.0 * 15.0);
        assert!(v.intrinsic_value.is_finite());
        assert!(v.margin_of_safety.is_finite());
        let json = serde_json::to_value(&v).unwrap();
        assert!(json["terminalValue"].is_number());
    }

    #[test]
    fn test_thesis_valuation_wire_names() {
        let engine = ValuationEngine::new();
        let thesis = ThesisInputs {
            current_price: 100.0,
            wacc_inputs: inputs(),
            projected_fcfs: vec![5.0],
            shares_outstanding: 1.0,
            terminal_growth: None,
            external_intrinsic_value: None,
        };
        let json = serde_json::to_value(engine.value_thesis(&thesis)).unwrap();
        assert!(json.get("intrinsicValue").is_some());
        assert!(json.get("marginOfSafety").is_some());
        assert!(json.get("costOfEquity").is_some());
        assert_eq!(json["costOfDebt"], 0.05);
        assert!((json["afterTaxCostOfDebt"].as_f64().unwrap() - 0.0395).abs() < 1e-12);
        assert_eq!(json["scenarios"][0]["name"], "bear");
        assert!(json["scenarios"][0].get("targetPrice").is_some());
    }
}
