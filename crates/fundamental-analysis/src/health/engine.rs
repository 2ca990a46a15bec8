use analysis_core::{
    Category, FinancialSnapshot, Financials, Metric, MetricUnit, RawSnapshot, SnapshotAdapter,
};
use serde::{Deserialize, Serialize};

use super::derive::snapshot_from_financials;
use super::policy::{AdviceKind, Grade, ScoringPolicy};

/// Per-category scores, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub profitability: f64,
    pub growth: f64,
    pub stability: f64,
    pub efficiency: f64,
    pub valuation: f64,
}

impl CategoryBreakdown {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Profitability => self.profitability,
            Category::Growth => self.growth,
            Category::Stability => self.stability,
            Category::Efficiency => self.efficiency,
            Category::Valuation => self.valuation,
        }
    }

    fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Profitability => self.profitability = value,
            Category::Growth => self.growth = value,
            Category::Stability => self.stability = value,
            Category::Efficiency => self.efficiency = value,
            Category::Valuation => self.valuation = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreData {
    pub score: u32,
    pub grade: Grade,
    pub breakdown: CategoryBreakdown,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Multi-factor financial health scorer.
///
/// Works purely on the canonical `FinancialSnapshot`; field-name probing
/// and scale inference happen in a `SnapshotAdapter` beforehand.
#[derive(Debug, Clone)]
pub struct HealthScoreEngine {
    policy: ScoringPolicy,
}

impl Default for HealthScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthScoreEngine {
    pub fn new() -> Self {
        Self {
            policy: ScoringPolicy::default(),
        }
    }

    pub fn with_policy(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Category score: achieved ladder points over the fixed category
    /// maximum, capped at 100. Absent metrics contribute nothing.
    pub fn category_score(&self, category: Category, snapshot: &FinancialSnapshot) -> f64 {
        let Some(policy) = self.policy.category(category) else {
            return 0.0;
        };
        if policy.max_points <= 0.0 {
            return 0.0;
        }

        let achieved: f64 = policy
            .ladders
            .iter()
            .filter_map(|ml| {
                let value = snapshot.get(ml.metric)?;
                let points = ml.ladder.points(value);
                tracing::trace!("{} = {:.2} -> {} pts", ml.metric.label(), value, points);
                Some(points)
            })
            .sum();

        (achieved / policy.max_points * 100.0).clamp(0.0, 100.0)
    }

    pub fn score(&self, snapshot: &FinancialSnapshot) -> HealthScoreData {
        let mut breakdown = CategoryBreakdown::default();
        let mut weighted = 0.0;
        for category in Category::ALL {
            let value = self.category_score(category, snapshot);
            breakdown.set(category, value);
            weighted += self
                .policy
                .category(category)
                .map(|c| c.weight)
                .unwrap_or(0.0)
                * value;
        }

        let score = weighted.round().clamp(0.0, 100.0) as u32;
        let grade = self.policy.grades.grade(score as f64);
        let (strengths, weaknesses) = self.advisory(snapshot);

        tracing::debug!(
            "Health score {} ({}) from {} metrics",
            score,
            grade,
            snapshot.present_count()
        );

        HealthScoreData {
            score,
            grade,
            breakdown,
            strengths,
            weaknesses,
        }
    }

    /// Normalize a provider payload with `adapter`, then score it.
    pub fn score_raw(&self, adapter: &dyn SnapshotAdapter, raw: &RawSnapshot) -> HealthScoreData {
        tracing::debug!("Scoring {} payload with {} fields", adapter.provider(), raw.0.len());
        self.score(&adapter.normalize(raw))
    }

    /// Score a provider payload, filling its gaps with ratios derived from
    /// the latest statements.
    pub fn score_with_statements(
        &self,
        adapter: &dyn SnapshotAdapter,
        raw: &RawSnapshot,
        statements: &Financials,
    ) -> HealthScoreData {
        let mut snapshot = adapter.normalize(raw);
        snapshot.fill_missing_from(&snapshot_from_financials(statements));
        self.score(&snapshot)
    }

    /// Strengths and weaknesses in rule order, each capped. Has no effect
    /// on the numeric score.
    pub fn advisory(&self, snapshot: &FinancialSnapshot) -> (Vec<String>, Vec<String>) {
        let advisory = &self.policy.advisory;
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        for rule in &advisory.rules {
            let Some(value) = snapshot.get(rule.metric) else {
                continue;
            };
            if !rule.comparison.matches(value) {
                continue;
            }
            let (list, cap) = match rule.kind {
                AdviceKind::Strength => (&mut strengths, advisory.max_strengths),
                AdviceKind::Weakness => (&mut weaknesses, advisory.max_weaknesses),
            };
            if list.len() < cap {
                list.push(rule.message.replace("{value}", &format_value(rule.metric, value)));
            }
        }

        (strengths, weaknesses)
    }
}

fn format_value(metric: Metric, value: f64) -> String {
    match metric.unit() {
        MetricUnit::Percent => format!("{:.1}%", value),
        MetricUnit::Ratio => format!("{:.2}", value),
    }
}
