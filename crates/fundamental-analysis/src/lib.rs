//! Fundamental analysis: DCF/WACC valuation and multi-factor health scoring.

pub mod health;
pub mod valuation;

pub use health::{HealthScoreData, HealthScoreEngine, ScoringPolicy, SnapshotNormalizer};
pub use valuation::{ThesisInputs, ThesisValuation, ValuationConfig, ValuationEngine, Verdict};
