//! Multi-factor financial health scoring.

pub mod derive;
pub mod engine;
pub mod normalizer;
pub mod policy;

pub use derive::snapshot_from_financials;
pub use engine::{CategoryBreakdown, HealthScoreData, HealthScoreEngine};
pub use normalizer::{infer_percent, SnapshotNormalizer, SynonymTable};
pub use policy::{
    AdviceKind, AdvisoryPolicy, AdvisoryRule, CategoryPolicy, Comparison, Direction, Floor,
    Grade, GradeTable, Ladder, MetricLadder, Rung, ScoringPolicy,
};
