//! DCF / WACC valuation.

pub mod config;
pub mod dcf;
pub mod engine;
pub mod estimators;
pub mod models;

pub use config::ValuationConfig;
pub use dcf::{WaccBreakdown, WaccInputs};
pub use engine::ValuationEngine;
pub use models::*;
