use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// One dated close price for a symbol or benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self { date: date.into(), price }
    }
}

/// Price series keyed by symbol. Series need not be sorted.
pub type PriceHistory = HashMap<String, Vec<PricePoint>>;

/// A recommended position. Exit fields are filled in by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub symbol: String,
    pub entry_price: f64,
    pub entry_date: String,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub exit_date: Option<String>,
}

impl Pick {
    pub fn new(symbol: impl Into<String>, entry_price: f64, entry_date: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            entry_price,
            entry_date: entry_date.into(),
            exit_price: None,
            exit_date: None,
        }
    }

    pub fn with_exit(mut self, exit_price: f64, exit_date: impl Into<String>) -> Self {
        self.exit_price = Some(exit_price);
        self.exit_date = Some(exit_date.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    Win,
    Loss,
}

/// A pick after evaluation. A pick with no exit price is treated as flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickResult {
    pub symbol: String,
    pub entry_price: f64,
    pub entry_date: String,
    pub exit_price: f64,
    pub exit_date: Option<String>,
    pub return_pct: f64,
    pub status: PickStatus,
    pub hold_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestPeriod {
    pub start: String,
    pub end: String,
    pub days: i64,
}

/// Aggregate performance of a pick list. Percent fields are in percent units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_hold_period: i64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub median_return: f64,
    pub average_win: f64,
    pub average_loss: f64,
    /// Gross wins over gross losses. None when nothing lost.
    pub profit_factor: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub benchmark_return: f64,
    pub alpha: f64,
    pub beta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub strategy_id: String,
    pub period: BacktestPeriod,
    pub performance: PerformanceMetrics,
    pub picks: Vec<PickResult>,
    pub vs_benchmark: BenchmarkComparison,
}
