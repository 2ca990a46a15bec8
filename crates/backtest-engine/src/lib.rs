pub mod models;
pub mod config;
pub mod dates;
pub mod prices;
pub mod metrics;
pub mod benchmark;
pub mod engine;

pub use models::*;
pub use config::{BacktestConfig, BetaMethod};
pub use engine::BacktestSimulator;
pub use metrics::{calculate_backtest_metrics, evaluate_pick};
pub use benchmark::BenchmarkComparer;
