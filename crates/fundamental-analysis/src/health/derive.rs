//! Ratios derived from raw statement values, for providers that only
//! expose financial statements.

use analysis_core::{FinancialSnapshot, Financials, Metric};

fn calculate_profit_margin(net_income: f64, revenue: f64) -> Option<f64> {
    if revenue > 0.0 {
        Some((net_income / revenue) * 100.0)
    } else {
        None
    }
}

fn calculate_gross_margin(gross_profit: f64, revenue: f64) -> Option<f64> {
    if revenue > 0.0 {
        Some((gross_profit / revenue) * 100.0)
    } else {
        None
    }
}

fn calculate_roe(net_income: f64, equity: f64) -> Option<f64> {
    if equity > 0.0 {
        Some((net_income / equity) * 100.0)
    } else {
        None
    }
}

fn calculate_roa(net_income: f64, assets: f64) -> Option<f64> {
    if assets > 0.0 {
        Some((net_income / assets) * 100.0)
    } else {
        None
    }
}

fn calculate_debt_to_equity(liabilities: f64, equity: f64) -> Option<f64> {
    if equity > 0.0 {
        Some(liabilities / equity)
    } else {
        None
    }
}

fn calculate_current_ratio(current_assets: f64, current_liabilities: f64) -> Option<f64> {
    if current_liabilities > 0.0 {
        Some(current_assets / current_liabilities)
    } else {
        None
    }
}

fn calculate_interest_coverage(operating_income: f64, interest_expense: f64) -> Option<f64> {
    let interest = interest_expense.abs();
    if interest > 0.0 {
        Some(operating_income / interest)
    } else {
        None
    }
}

fn calculate_asset_turnover(revenue: f64, assets: f64) -> Option<f64> {
    if assets > 0.0 {
        Some(revenue / assets)
    } else {
        None
    }
}

fn both(a: Option<f64>, b: Option<f64>, f: fn(f64, f64) -> Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => f(a, b),
        _ => None,
    }
}

/// Canonical snapshot computed from one period's statements.
///
/// Margins and returns come out in percent units, so no scale inference is
/// applied. Growth and market multiples need more than one period or a
/// price, and stay absent.
pub fn snapshot_from_financials(financials: &Financials) -> FinancialSnapshot {
    let f = financials;
    let mut snapshot = FinancialSnapshot::default();
    snapshot.set(Metric::NetMargin, both(f.net_income, f.revenue, calculate_profit_margin));
    snapshot.set(Metric::GrossMargin, both(f.gross_profit, f.revenue, calculate_gross_margin));
    snapshot.set(Metric::ReturnOnEquity, both(f.net_income, f.shareholders_equity, calculate_roe));
    snapshot.set(Metric::ReturnOnAssets, both(f.net_income, f.total_assets, calculate_roa));
    snapshot.set(
        Metric::DebtToEquity,
        both(f.total_liabilities, f.shareholders_equity, calculate_debt_to_equity),
    );
    snapshot.set(
        Metric::CurrentRatio,
        both(f.current_assets, f.current_liabilities, calculate_current_ratio),
    );
    snapshot.set(
        Metric::InterestCoverage,
        both(f.operating_income, f.interest_expense, calculate_interest_coverage),
    );
    snapshot.set(Metric::AssetTurnover, both(f.revenue, f.total_assets, calculate_asset_turnover));

    tracing::debug!(
        "Derived {} ratios from {} {} statements",
        snapshot.present_count(),
        f.symbol,
        f.fiscal_period
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements() -> Financials {
        Financials {
            symbol: "AAA".to_string(),
            fiscal_period: "FY".to_string(),
            fiscal_year: 2024,
            revenue: Some(1_000.0),
            gross_profit: Some(600.0),
            operating_income: Some(300.0),
            net_income: Some(200.0),
            total_assets: Some(2_000.0),
            total_liabilities: Some(800.0),
            shareholders_equity: Some(1_200.0),
            current_assets: Some(900.0),
            current_liabilities: Some(300.0),
            interest_expense: Some(-20.0),
        }
    }

    #[test]
    fn test_ratios_from_statements() {
        let snap = snapshot_from_financials(&statements());
        assert!((snap.net_margin.unwrap() - 20.0).abs() < 1e-9);
        assert!((snap.gross_margin.unwrap() - 60.0).abs() < 1e-9);
        assert!((snap.return_on_equity.unwrap() - 16.666_666).abs() < 1e-3);
        assert!((snap.return_on_assets.unwrap() - 10.0).abs() < 1e-9);
        assert!((snap.debt_to_equity.unwrap() - 0.666_666).abs() < 1e-3);
        assert!((snap.current_ratio.unwrap() - 3.0).abs() < 1e-9);
        assert!((snap.interest_coverage.unwrap() - 15.0).abs() < 1e-9);
        assert!((snap.asset_turnover.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(snap.price_to_earnings, None);
        assert_eq!(snap.revenue_growth, None);
    }

    #[test]
    fn test_zero_denominators_are_absent() {
        let f = Financials {
            revenue: Some(0.0),
            shareholders_equity: Some(-50.0),
            total_assets: None,
            interest_expense: Some(0.0),
            ..statements()
        };
        let snap = snapshot_from_financials(&f);
        assert_eq!(snap.net_margin, None);
        assert_eq!(snap.gross_margin, None);
        assert_eq!(snap.return_on_equity, None);
        assert_eq!(snap.debt_to_equity, None);
        assert_eq!(snap.return_on_assets, None);
        assert_eq!(snap.interest_coverage, None);
    }
}
