use chrono::{NaiveDate, TimeDelta};
use rayon::prelude::*;

use crate::benchmark::BenchmarkComparer;
use crate::config::BacktestConfig;
use crate::dates::{format_date, parse_date};
use crate::metrics::{evaluate_pick, metrics_from_results};
use crate::models::*;
use crate::prices::price_on_or_after;

/// Replays a list of picks against historical prices with a fixed holding
/// period and compares the outcome with a benchmark series. Stateless between calls.
pub struct BacktestSimulator {
    config: BacktestConfig,
}

impl Default for BacktestSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl BacktestSimulator {
    pub fn new() -> Self {
        Self { config: BacktestConfig::default() }
    }

    pub fn with_config(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run a strategy. `hold_period_days` of None uses the configured default.
    pub fn simulate_strategy(
        &self,
        strategy_id: &str,
        picks: &[Pick],
        historical_prices: &PriceHistory,
        benchmark_prices: &[PricePoint],
        hold_period_days: Option<i64>,
    ) -> BacktestResult {
        let hold = hold_period_days
            .unwrap_or(self.config.default_hold_period_days)
            .max(0);

        let resolved: Vec<Pick> = picks
            .par_iter()
            .map(|pick| self.resolve_pick(pick, historical_prices, hold))
            .collect();
        let results: Vec<PickResult> = resolved.iter().map(evaluate_pick).collect();

        let period = period_of(&resolved);
        let performance = metrics_from_results(&results, &period.start, &period.end, &self.config);
        let vs_benchmark = BenchmarkComparer::compare(
            performance.total_return,
            &results,
            benchmark_prices,
            &period,
            &self.config,
        );

        tracing::info!(
            "Backtest {}: {} picks over {} days, return {:.2}%, win rate {:.1}%, alpha {:.2}",
            strategy_id,
            performance.total_trades,
            period.days,
            performance.total_return,
            performance.win_rate,
            vs_benchmark.alpha
        );

        BacktestResult {
            strategy_id: strategy_id.to_string(),
            period,
            performance,
            picks: results,
            vs_benchmark,
        }
    }

    /// Fill in the exit of one pick: `entry + hold` days, priced at the first
    /// point on or after that date. Falls back to the entry price.
    pub fn resolve_pick(&self, pick: &Pick, history: &PriceHistory, hold_days: i64) -> Pick {
        let mut resolved = pick.clone();
        resolved.exit_price = Some(pick.entry_price);
        resolved.exit_date = None;

        let Some(entry) = parse_date(&pick.entry_date) else {
            tracing::debug!(
                "{}: unparsable entry date {:?}, treating as flat",
                pick.symbol,
                pick.entry_date
            );
            return resolved;
        };
        let Some(exit) = exit_date(entry, hold_days) else {
            tracing::debug!("{}: exit date out of range, treating as flat", pick.symbol);
            return resolved;
        };
        resolved.exit_date = Some(format_date(exit));

        match history
            .get(&pick.symbol)
            .and_then(|series| price_on_or_after(series, exit))
        {
            Some(point) => resolved.exit_price = Some(point.price),
            None => tracing::debug!(
                "{}: no price on or after {}, exit at entry price",
                pick.symbol,
                exit
            ),
        }
        resolved
    }
}

fn exit_date(entry: NaiveDate, hold_days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(hold_days).and_then(|delta| entry.checked_add_signed(delta))
}

/// Earliest entry to latest exit. Empty when no pick has a usable date.
fn period_of(picks: &[Pick]) -> BacktestPeriod {
    let start = picks.iter().filter_map(|p| parse_date(&p.entry_date)).min();
    let end = picks
        .iter()
        .filter_map(|p| p.exit_date.as_deref().and_then(parse_date))
        .max();

    match (start, end) {
        (Some(start), Some(end)) => BacktestPeriod {
            start: format_date(start),
            end: format_date(end),
            days: (end - start).num_days().max(0),
        },
        (Some(start), None) => BacktestPeriod {
            start: format_date(start),
            end: format_date(start),
            days: 0,
        },
        _ => BacktestPeriod::default(),
    }
}
