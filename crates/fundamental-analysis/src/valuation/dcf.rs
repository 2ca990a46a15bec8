//! Discounted-cash-flow primitives.
//!
//! Pure functions over plain numbers. Every guard resolves to a documented
//! finite default instead of NaN or infinity.

use serde::{Deserialize, Serialize};

/// Equity risk premium used when the caller has none.
pub const DEFAULT_EQUITY_RISK_PREMIUM: f64 = 0.055;
/// Perpetual growth rate used when the caller has none.
pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.025;
/// Terminal value multiple of the last FCF when WACC does not exceed growth.
pub const TERMINAL_FALLBACK_MULTIPLE: f64 = 15.0;

/// Inputs to the WACC calculation. All rates are fractions (0.045 = 4.5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaccInputs {
    pub risk_free_rate: f64,
    pub beta: f64,
    pub equity_risk_premium: f64,
    pub cost_of_debt: f64,
    pub tax_rate: f64,
    pub debt_to_equity: f64,
}

/// WACC together with the components it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaccBreakdown {
    pub cost_of_equity: f64,
    pub after_tax_cost_of_debt: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    pub wacc: f64,
}

/// CAPM: `rf + beta * erp`.
pub fn cost_of_equity(risk_free_rate: f64, beta: f64, equity_risk_premium: f64) -> f64 {
    risk_free_rate + beta * equity_risk_premium
}

pub fn wacc_breakdown(inputs: &WaccInputs) -> WaccBreakdown {
    // Negative or non-finite D/E would put the weights outside [0, 1].
    let de = if inputs.debt_to_equity.is_finite() && inputs.debt_to_equity > 0.0 {
        inputs.debt_to_equity
    } else {
        0.0
    };
    let equity_weight = 1.0 / (1.0 + de);
    let debt_weight = de / (1.0 + de);

    let ke = cost_of_equity(inputs.risk_free_rate, inputs.beta, inputs.equity_risk_premium);
    let kd_after_tax = inputs.cost_of_debt * (1.0 - inputs.tax_rate);

    WaccBreakdown {
        cost_of_equity: ke,
        after_tax_cost_of_debt: kd_after_tax,
        equity_weight,
        debt_weight,
        wacc: equity_weight * ke + debt_weight * kd_after_tax,
    }
}

pub fn wacc(inputs: &WaccInputs) -> f64 {
    wacc_breakdown(inputs).wacc
}

/// Gordon Growth terminal value: `last_fcf * (1 + g) / (wacc - g)`.
///
/// When `wacc <= g`, or either rate is not finite, the formula is negative,
/// unbounded or NaN, so `last_fcf * fallback_multiple` is returned instead.
pub fn terminal_value(last_fcf: f64, wacc: f64, growth: f64, fallback_multiple: f64) -> f64 {
    if !(wacc.is_finite() && growth.is_finite()) || wacc <= growth {
        tracing::debug!(
            "WACC {:.4} <= terminal growth {:.4}, using {}x fallback multiple",
            wacc,
            growth,
            fallback_multiple
        );
        return last_fcf * fallback_multiple;
    }
    last_fcf * (1.0 + growth) / (wacc - growth)
}

/// Present value per share of the explicit FCF forecast plus terminal value.
///
/// `FCF_t` is discounted at `(1 + wacc)^t` for t = 1..N and the terminal
/// value at `(1 + wacc)^N`. Returns 0 for an empty forecast, non-positive
/// share count, or a discount base that is not positive.
pub fn intrinsic_value_per_share(
    projected_fcfs: &[f64],
    wacc: f64,
    terminal_value: f64,
    shares_outstanding: f64,
) -> f64 {
    if projected_fcfs.is_empty() || shares_outstanding.is_nan() || shares_outstanding <= 0.0 {
        return 0.0;
    }
    let base = 1.0 + wacc;
    if base.is_nan() || base <= 0.0 {
        tracing::debug!("Discount base {:.4} is not positive, intrinsic value forced to 0", base);
        return 0.0;
    }

    let pv_fcfs: f64 = projected_fcfs
        .iter()
        .enumerate()
        .map(|(i, fcf)| fcf / base.powi(i as i32 + 1))
        .sum();
    let pv_terminal = terminal_value / base.powi(projected_fcfs.len() as i32);

    let per_share = (pv_fcfs + pv_terminal) / shares_outstanding;
    if per_share.is_finite() {
        per_share
    } else {
        0.0
    }
}

/// `(intrinsic - price) / intrinsic * 100`, or 0 when intrinsic is not positive.
pub fn margin_of_safety(price: f64, intrinsic: f64) -> f64 {
    if intrinsic.is_nan() || intrinsic <= 0.0 {
        return 0.0;
    }
    (intrinsic - price) / intrinsic * 100.0
}

/// Forecast `years` free cash flows growing from `base_fcf` at `growth`.
pub fn project_fcfs(base_fcf: f64, growth: f64, years: u32) -> Vec<f64> {
    (1..=years as i32)
        .map(|t| base_fcf * (1.0 + growth).powi(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> WaccInputs {
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
    fn test_cost_of_equity_capm() {
        assert!((cost_of_equity(0.04, 1.2, 0.055) - 0.106).abs() < 1e-12);
        assert!((cost_of_equity(0.045, 1.0, DEFAULT_EQUITY_RISK_PREMIUM) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_wacc_end_to_end_components() {
        let b = wacc_breakdown(&sample_inputs());
        assert!((b.cost_of_equity - 0.106).abs() < 1e-9);
        assert!((b.equity_weight - 0.667).abs() < 1e-3);
        assert!((b.debt_weight - 0.333).abs() < 1e-3);
        assert!((b.after_tax_cost_of_debt - 0.0395).abs() < 1e-9);
        assert!((b.wacc - 0.0838).abs() < 1e-3);
        assert!((b.equity_weight + b.debt_weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wacc_without_debt_is_cost_of_equity() {
        let inputs = WaccInputs { debt_to_equity: 0.0, ..sample_inputs() };
        assert_eq!(wacc(&inputs), cost_of_equity(0.04, 1.2, 0.055));
    }

    #[test]
    fn test_wacc_negative_leverage_treated_as_unlevered() {
        let inputs = WaccInputs { debt_to_equity: -1.0, ..sample_inputs() };
        let w = wacc(&inputs);
        assert!(w.is_finite());
        assert_eq!(w, cost_of_equity(0.04, 1.2, 0.055));
    }

    #[test]
    fn test_terminal_value_gordon_growth() {
        let tv = terminal_value(100.0, 0.09, 0.025, TERMINAL_FALLBACK_MULTIPLE);
        assert!((tv - 100.0 * 1.025 / 0.065).abs() < 1e-9);
    }

    #[test]
    fn test_terminal_value_fallback_when_wacc_not_above_growth() {
        assert_eq!(terminal_value(100.0, 0.025, 0.025, 15.0), 1500.0);
        assert_eq!(terminal_value(100.0, 0.02, 0.025, 15.0), 1500.0);
    }

    #[test]
    fn test_terminal_value_fallback_on_non_finite_rates() {
        assert_eq!(terminal_value(100.0, f64::NAN, 0.025, 15.0), 1500.0);
        assert_eq!(terminal_value(100.0, 0.08, f64::NAN, 15.0), 1500.0);
        assert_eq!(terminal_value(100.0, f64::INFINITY, 0.025, 15.0), 1500.0);
    }

    #[test]
    fn test_intrinsic_value_discounting() {
        // Single year: (100 + 1000) / 1.1 / 10 shares
        let v = intrinsic_value_per_share(&[100.0], 0.10, 1000.0, 10.0);
        assert!((v - 100.0).abs() < 1e-9);

        // Two years
        let v = intrinsic_value_per_share(&[110.0, 121.0], 0.10, 1210.0, 1.0);
        let expected = 110.0 / 1.1 + 121.0 / 1.21 + 1210.0 / 1.21;
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn test_intrinsic_value_guards() {
        assert_eq!(intrinsic_value_per_share(&[], 0.1, 1000.0, 10.0), 0.0);
        assert_eq!(intrinsic_value_per_share(&[100.0], 0.1, 1000.0, 0.0), 0.0);
        assert_eq!(intrinsic_value_per_share(&[100.0], 0.1, 1000.0, -5.0), 0.0);
        assert_eq!(intrinsic_value_per_share(&[100.0], -1.0, 1000.0, 10.0), 0.0);
        assert_eq!(intrinsic_value_per_share(&[100.0], 0.1, 1000.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_margin_of_safety() {
        assert_eq!(margin_of_safety(100.0, 100.0), 0.0);
        assert!((margin_of_safety(100.0, 120.0) - 16.67).abs() < 0.01);
        assert!(margin_of_safety(150.0, 100.0) < 0.0);
        for price in [0.0, 50.0, -3.0, 1e9] {
            assert_eq!(margin_of_safety(price, 0.0), 0.0);
            assert_eq!(margin_of_safety(price, -10.0), 0.0);
        }
    }

    #[test]
    fn test_project_fcfs() {
        let fcfs = project_fcfs(100.0, 0.10, 3);
        assert_eq!(fcfs.len(), 3);
        assert!((fcfs[0] - 110.0).abs() < 1e-9);
        assert!((fcfs[2] - 133.1).abs() < 1e-9);
        assert!(project_fcfs(100.0, 0.1, 0).is_empty());
    }
}
