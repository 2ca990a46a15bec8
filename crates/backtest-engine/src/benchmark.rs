use analysis_core::stats;

use crate::config::{BacktestConfig, BetaMethod};
use crate::dates::parse_date;
use crate::models::{BacktestPeriod, BenchmarkComparison, PickResult, PricePoint};
use crate::prices::price_on_or_after;

/// Percent change of the benchmark between the first points on or after
/// `start` and `end`. None when either side has no data.
pub fn benchmark_return(points: &[PricePoint], start: &str, end: &str) -> Option<f64> {
    let start_point = price_on_or_after(points, parse_date(start)?)?;
    let end_point = price_on_or_after(points, parse_date(end)?)?;
    if start_point.price <= 0.0 {
        return None;
    }
    Some((end_point.price - start_point.price) / start_point.price * 100.0)
}

/// Beta of pick returns against the benchmark over each pick's own holding window.
pub fn covariance_beta(
    picks: &[PickResult],
    benchmark: &[PricePoint],
    min_observations: usize,
) -> Option<f64> {
    let (pick_returns, bench_returns): (Vec<f64>, Vec<f64>) = picks
        .iter()
        .filter_map(|pick| {
            let exit = pick.exit_date.as_deref()?;
            let bench = benchmark_return(benchmark, &pick.entry_date, exit)?;
            Some((pick.return_pct, bench))
        })
        .unzip();

    if pick_returns.len() < min_observations {
        return None;
    }
    let bench_variance = stats::population_variance(&bench_returns);
    if bench_variance <= 1e-12 {
        return None;
    }
    Some(stats::population_covariance(&pick_returns, &bench_returns) / bench_variance)
}

pub struct BenchmarkComparer;

impl BenchmarkComparer {
    /// Compare a strategy's total return with the benchmark over `period`.
    pub fn compare(
        total_return: f64,
        picks: &[PickResult],
        benchmark: &[PricePoint],
        period: &BacktestPeriod,
        config: &BacktestConfig,
    ) -> BenchmarkComparison {
        let benchmark_return = benchmark_return(benchmark, &period.start, &period.end)
            .unwrap_or_else(|| {
                tracing::debug!(
                    "No benchmark data for {}..{}, using 0% benchmark return",
                    period.start,
                    period.end
                );
                0.0
            });

        let beta = match config.beta_method {
            BetaMethod::Fixed => config.fixed_beta,
            BetaMethod::Covariance => {
                covariance_beta(picks, benchmark, config.min_beta_observations).unwrap_or_else(|| {
                    tracing::debug!(
                        "Too little benchmark overlap for covariance beta, using {}",
                        config.fixed_beta
                    );
                    config.fixed_beta
                })
            }
        };

        BenchmarkComparison {
            benchmark_return,
            alpha: total_return - benchmark_return,
            beta,
        }
    }
}
