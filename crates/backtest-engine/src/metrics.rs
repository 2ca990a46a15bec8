use analysis_core::stats;

use crate::config::BacktestConfig;
use crate::dates::days_between;
use crate::models::{PerformanceMetrics, Pick, PickResult, PickStatus};

/// Percent change from entry to exit. Zero when the entry price cannot anchor a return.
pub fn pick_return(entry_price: f64, exit_price: f64) -> f64 {
    if !(entry_price.is_finite() && exit_price.is_finite()) || entry_price <= 0.0 {
        return 0.0;
    }
    (exit_price - entry_price) / entry_price * 100.0
}

/// Evaluate one pick. A missing exit price means the position is flat.
pub fn evaluate_pick(pick: &Pick) -> PickResult {
    let exit_price = match pick.exit_price {
        Some(price) if price.is_finite() => price,
        _ => pick.entry_price,
    };
    let return_pct = pick_return(pick.entry_price, exit_price);
    // A zero return counts as a loss.
    let status = if return_pct > 0.0 { PickStatus::Win } else { PickStatus::Loss };
    let hold_days = pick
        .exit_date
        .as_deref()
        .and_then(|exit| days_between(&pick.entry_date, exit))
        .unwrap_or(0)
        .max(0);

    PickResult {
        symbol: pick.symbol.clone(),
        entry_price: pick.entry_price,
        entry_date: pick.entry_date.clone(),
        exit_price,
        exit_date: pick.exit_date.clone(),
        return_pct,
        status,
        hold_days,
    }
}

/// Aggregate metrics for a pick list over `start..end`. Pure: no price lookup happens here.
pub fn calculate_backtest_metrics(
    picks: &[Pick],
    start: &str,
    end: &str,
    config: &BacktestConfig,
) -> PerformanceMetrics {
    let results: Vec<PickResult> = picks.iter().map(evaluate_pick).collect();
    metrics_from_results(&results, start, end, config)
}

pub(crate) fn metrics_from_results(
    results: &[PickResult],
    start: &str,
    end: &str,
    config: &BacktestConfig,
) -> PerformanceMetrics {
    if results.is_empty() {
        return PerformanceMetrics::default();
    }

    let returns: Vec<f64> = results.iter().map(|r| r.return_pct).collect();
    let total_return = stats::mean(&returns);

    let elapsed_days = days_between(start, end).unwrap_or(0).max(1) as f64;
    let annualized_return = total_return * config.days_per_year / elapsed_days;

    let best_trade = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let worst_trade = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let max_drawdown = (-worst_trade).max(0.0);

    let std_dev = stats::population_std_dev(&returns);
    let sharpe_ratio = if std_dev > 1e-12 {
        (total_return - config.risk_free_rate) / std_dev
    } else {
        0.0
    };

    let wins: Vec<f64> = results
        .iter()
        .filter(|r| r.status == PickStatus::Win)
        .map(|r| r.return_pct)
        .collect();
    let losses: Vec<f64> = results
        .iter()
        .filter(|r| r.status == PickStatus::Loss)
        .map(|r| r.return_pct)
        .collect();

    let total_trades = results.len();
    let win_rate = wins.len() as f64 / total_trades as f64 * 100.0;

    let hold_days: Vec<f64> = results.iter().map(|r| r.hold_days as f64).collect();
    let avg_hold_period = stats::mean(&hold_days).round() as i64;

    let gross_win: f64 = wins.iter().sum();
    let gross_loss: f64 = -losses.iter().sum::<f64>();
    let profit_factor = if gross_loss > 0.0 { Some(gross_win / gross_loss) } else { None };

    PerformanceMetrics {
        total_return,
        annualized_return,
        max_drawdown,
        sharpe_ratio,
        win_rate,
        total_trades,
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        avg_hold_period,
        best_trade,
        worst_trade,
        median_return: stats::median(&returns),
        average_win: stats::mean(&wins),
        average_loss: stats::mean(&losses),
        profit_factor,
    }
}
