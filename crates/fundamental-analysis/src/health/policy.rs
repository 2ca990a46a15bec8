//! Scoring policy: ladders, category maxima and weights, grade table and
//! advisory rules.
//!
//! The policy is plain data. `ScoringPolicy::default()` is the standard
//! house policy; callers may build their own and `validate()` it.

use analysis_core::{AnalysisError, Category, Metric};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Values outside the floor earn no points regardless of the rungs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Floor {
    /// Value must be strictly greater than the bound.
    Above(f64),
    /// Value must be greater than or equal to the bound.
    AtLeast(f64),
}

impl Floor {
    fn admits(&self, value: f64) -> bool {
        match *self {
            Floor::Above(bound) => value > bound,
            Floor::AtLeast(bound) => value >= bound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rung {
    pub threshold: f64,
    pub points: f64,
}

/// Ordered threshold ladder. The first rung the value strictly beats wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ladder {
    pub direction: Direction,
    pub rungs: Vec<Rung>,
    #[serde(default)]
    pub floor: Option<Floor>,
}

impl Ladder {
    pub fn higher(rungs: &[(f64, f64)]) -> Self {
        Self::build(Direction::HigherIsBetter, rungs)
    }

    pub fn lower(rungs: &[(f64, f64)]) -> Self {
        Self::build(Direction::LowerIsBetter, rungs)
    }

    fn build(direction: Direction, rungs: &[(f64, f64)]) -> Self {
        Self {
            direction,
            rungs: rungs
                .iter()
                .map(|&(threshold, points)| Rung { threshold, points })
                .collect(),
            floor: None,
        }
    }

    pub fn with_floor(mut self, floor: Floor) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Points awarded for `value`; 0 when no rung matches.
    pub fn points(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        if let Some(floor) = &self.floor {
            if !floor.admits(value) {
                return 0.0;
            }
        }
        self.rungs
            .iter()
            .find(|rung| match self.direction {
                Direction::HigherIsBetter => value > rung.threshold,
                Direction::LowerIsBetter => value < rung.threshold,
            })
            .map(|rung| rung.points)
            .unwrap_or(0.0)
    }

    /// Best attainable award.
    pub fn max_points(&self) -> f64 {
        self.rungs.iter().map(|r| r.points).fold(0.0, f64::max)
    }

    fn validate(&self, metric: Metric) -> Result<(), AnalysisError> {
        if self.rungs.is_empty() {
            return Err(AnalysisError::InvalidConfig(format!(
                "{} ladder has no rungs",
                metric.label()
            )));
        }
        for pair in self.rungs.windows(2) {
            let ordered = match self.direction {
                Direction::HigherIsBetter => pair[0].threshold > pair[1].threshold,
                Direction::LowerIsBetter => pair[0].threshold < pair[1].threshold,
            };
            if !ordered {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} ladder thresholds are not ordered best-first",
                    metric.label()
                )));
            }
        }
        if self.rungs.iter().any(|r| !(r.points.is_finite() && r.points >= 0.0)) {
            return Err(AnalysisError::InvalidConfig(format!(
                "{} ladder has negative or non-finite points",
                metric.label()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLadder {
    pub metric: Metric,
    pub ladder: Ladder,
}

/// One scoring category: its ladders, fixed denominator and composite weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    pub category: Category,
    pub weight: f64,
    /// Fixed maximum attainable points. Does not shrink when metrics are
    /// missing, so absent data can only lower the category score.
    pub max_points: f64,
    pub ladders: Vec<MetricLadder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descending (minimum score, grade) steps; anything below the last is `F`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeTable {
    pub steps: Vec<(f64, Grade)>,
}

impl Default for GradeTable {
    fn default() -> Self {
        Self {
            steps: vec![
                (95.0, Grade::APlus),
                (90.0, Grade::A),
                (85.0, Grade::AMinus),
                (80.0, Grade::BPlus),
                (75.0, Grade::B),
                (70.0, Grade::BMinus),
                (65.0, Grade::CPlus),
                (60.0, Grade::C),
                (55.0, Grade::CMinus),
                (50.0, Grade::D),
            ],
        }
    }
}

impl GradeTable {
    pub fn grade(&self, score: f64) -> Grade {
        self.steps
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceKind {
    Strength,
    Weakness,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above(f64),
    Below(f64),
    /// Half-open `[min, max)`.
    InRange { min: f64, max: f64 },
}

impl Comparison {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Comparison::Above(t) => value > t,
            Comparison::Below(t) => value < t,
            Comparison::InRange { min, max } => value >= min && value < max,
        }
    }
}

/// A single threshold crossing that produces advisory text.
///
/// `message` may contain `{value}`, replaced by the formatted metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRule {
    pub metric: Metric,
    pub comparison: Comparison,
    pub kind: AdviceKind,
    pub message: String,
}

impl AdvisoryRule {
    fn new(metric: Metric, comparison: Comparison, kind: AdviceKind, message: &str) -> Self {
        Self {
            metric,
            comparison,
            kind,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryPolicy {
    pub rules: Vec<AdvisoryRule>,
    pub max_strengths: usize,
    pub max_weaknesses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub categories: Vec<CategoryPolicy>,
    pub grades: GradeTable,
    pub advisory: AdvisoryPolicy,
}

impl ScoringPolicy {
    pub fn category(&self, category: Category) -> Option<&CategoryPolicy> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for category in Category::ALL {
            if self.category(category).is_none() {
                return Err(AnalysisError::InvalidConfig(format!(
                    "no policy for category {:?}",
                    category
                )));
            }
        }

        let mut weight_sum = 0.0;
        for cat in &self.categories {
            if !(cat.max_points.is_finite() && cat.max_points > 0.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{:?} max_points must be positive",
                    cat.category
                )));
            }
            if !(cat.weight.is_finite() && cat.weight >= 0.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{:?} weight must be non-negative",
                    cat.category
                )));
            }
            weight_sum += cat.weight;
            for ml in &cat.ladders {
                if ml.metric.category() != cat.category {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "{} does not belong to {:?}",
                        ml.metric.label(),
                        cat.category
                    )));
                }
                ml.ladder.validate(ml.metric)?;
            }
        }
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(AnalysisError::InvalidConfig(format!(
                "category weights sum to {:.4}, expected 1.0",
                weight_sum
            )));
        }

        for pair in self.grades.steps.windows(2) {
            if pair[0].0 <= pair[1].0 {
                return Err(AnalysisError::InvalidConfig(
                    "grade thresholds must be strictly descending".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryPolicy {
                    category: Category::Profitability,
                    weight: 0.25,
                    max_points: 100.0,
                    ladders: vec![
                        ladder(
                            Metric::NetMargin,
                            Ladder::higher(&[(20.0, 25.0), (10.0, 20.0), (5.0, 15.0), (0.0, 10.0)]),
                        ),
                        ladder(
                            Metric::ReturnOnEquity,
                            Ladder::higher(&[
                                (20.0, 25.0),
                                (15.0, 20.0),
                                (10.0, 15.0),
                                (0.0, 10.0),
                            ]),
                        ),
                        ladder(
                            Metric::ReturnOnAssets,
                            Ladder::higher(&[(10.0, 25.0), (5.0, 20.0), (2.0, 15.0), (0.0, 10.0)]),
                        ),
                        ladder(
                            Metric::GrossMargin,
                            Ladder::higher(&[
                                (50.0, 25.0),
                                (35.0, 20.0),
                                (20.0, 15.0),
                                (0.0, 10.0),
                            ]),
                        ),
                    ],
                },
                CategoryPolicy {
                    category: Category::Growth,
                    weight: 0.20,
                    max_points: 100.0,
                    ladders: vec![
                        ladder(
                            Metric::RevenueGrowth,
                            Ladder::higher(&[(20.0, 35.0), (10.0, 25.0), (5.0, 15.0), (0.0, 10.0)]),
                        ),
                        ladder(
                            Metric::EpsGrowth,
                            Ladder::higher(&[(20.0, 35.0), (10.0, 25.0), (5.0, 15.0), (0.0, 10.0)]),
                        ),
                        ladder(
                            Metric::BookValueGrowth,
                            Ladder::higher(&[(15.0, 30.0), (8.0, 20.0), (3.0, 10.0), (0.0, 5.0)]),
                        ),
                    ],
                },
                CategoryPolicy {
                    category: Category::Stability,
                    weight: 0.25,
                    max_points: 100.0,
                    ladders: vec![
                        // Negative D/E means negative equity, not a clean balance sheet.
                        ladder(
                            Metric::DebtToEquity,
                            Ladder::lower(&[(0.5, 35.0), (1.0, 25.0), (2.0, 15.0), (3.0, 5.0)])
                                .with_floor(Floor::AtLeast(0.0)),
                        ),
                        ladder(
                            Metric::CurrentRatio,
                            Ladder::higher(&[(2.0, 35.0), (1.5, 25.0), (1.0, 15.0), (0.5, 5.0)]),
                        ),
                        ladder(
                            Metric::InterestCoverage,
                            Ladder::higher(&[(10.0, 30.0), (5.0, 20.0), (2.0, 10.0), (1.0, 5.0)]),
                        ),
                    ],
                },
                CategoryPolicy {
                    category: Category::Efficiency,
                    weight: 0.15,
                    max_points: 100.0,
                    ladders: vec![
                        ladder(
                            Metric::AssetTurnover,
                            Ladder::higher(&[(1.0, 35.0), (0.7, 25.0), (0.4, 15.0), (0.0, 5.0)]),
                        ),
                        ladder(
                            Metric::InventoryTurnover,
                            Ladder::higher(&[(8.0, 30.0), (5.0, 20.0), (3.0, 10.0), (0.0, 5.0)]),
                        ),
                        ladder(
                            Metric::ReturnOnInvestedCapital,
                            Ladder::higher(&[(15.0, 35.0), (10.0, 25.0), (5.0, 15.0), (0.0, 5.0)]),
                        ),
                    ],
                },
                CategoryPolicy {
                    category: Category::Valuation,
                    weight: 0.15,
                    max_points: 100.0,
                    ladders: vec![
                        // Multiples on negative earnings or book are meaningless.
                        ladder(
                            Metric::PriceToEarnings,
                            Ladder::lower(&[(15.0, 35.0), (25.0, 25.0), (35.0, 15.0), (50.0, 5.0)])
                                .with_floor(Floor::Above(0.0)),
                        ),
                        ladder(
                            Metric::PriceToBook,
                            Ladder::lower(&[(1.5, 30.0), (3.0, 20.0), (5.0, 10.0), (10.0, 5.0)])
                                .with_floor(Floor::Above(0.0)),
                        ),
                        ladder(
                            Metric::PriceToSales,
                            Ladder::lower(&[(1.0, 35.0), (3.0, 25.0), (5.0, 15.0), (10.0, 5.0)])
                                .with_floor(Floor::Above(0.0)),
                        ),
                    ],
                },
            ],
            grades: GradeTable::default(),
            advisory: AdvisoryPolicy {
                rules: default_advisory_rules(),
                max_strengths: 5,
                max_weaknesses: 5,
            },
        }
    }
}

fn ladder(metric: Metric, ladder: Ladder) -> MetricLadder {
    MetricLadder { metric, ladder }
}

fn default_advisory_rules() -> Vec<AdvisoryRule> {
    use AdviceKind::{Strength, Weakness};
    use Comparison::{Above, Below, InRange};

    vec![
        AdvisoryRule::new(
            Metric::ReturnOnEquity,
            Above(20.0),
            Strength,
            "Exceptional return on equity ({value})",
        ),
        AdvisoryRule::new(
            Metric::NetMargin,
            Above(20.0),
            Strength,
            "High net profit margin ({value})",
        ),
        AdvisoryRule::new(
            Metric::RevenueGrowth,
            Above(15.0),
            Strength,
            "Strong revenue growth ({value})",
        ),
        AdvisoryRule::new(
            Metric::EpsGrowth,
            Above(20.0),
            Strength,
            "Rapid earnings growth ({value})",
        ),
        AdvisoryRule::new(
            Metric::DebtToEquity,
            InRange { min: 0.0, max: 0.5 },
            Strength,
            "Conservative balance sheet (D/E {value})",
        ),
        AdvisoryRule::new(
            Metric::CurrentRatio,
            Above(2.0),
            Strength,
            "Strong liquidity position (current ratio {value})",
        ),
        AdvisoryRule::new(
            Metric::InterestCoverage,
            Above(10.0),
            Strength,
            "Comfortable interest coverage ({value})",
        ),
        AdvisoryRule::new(
            Metric::ReturnOnInvestedCapital,
            Above(15.0),
            Strength,
            "High return on invested capital ({value})",
        ),
        AdvisoryRule::new(
            Metric::GrossMargin,
            Above(50.0),
            Strength,
            "Strong pricing power (gross margin {value})",
        ),
        AdvisoryRule::new(
            Metric::PriceToEarnings,
            InRange { min: 0.0, max: 15.0 },
            Strength,
            "Attractive earnings multiple (P/E {value})",
        ),
        AdvisoryRule::new(Metric::NetMargin, Below(0.0), Weakness, "Negative net margin ({value})"),
        AdvisoryRule::new(
            Metric::ReturnOnEquity,
            Below(0.0),
            Weakness,
            "Negative return on equity ({value})",
        ),
        AdvisoryRule::new(
            Metric::RevenueGrowth,
            Below(0.0),
            Weakness,
            "Declining revenue ({value})",
        ),
        AdvisoryRule::new(Metric::EpsGrowth, Below(0.0), Weakness, "Declining earnings ({value})"),
        AdvisoryRule::new(
            Metric::DebtToEquity,
            Above(2.0),
            Weakness,
            "High leverage (D/E {value})",
        ),
        AdvisoryRule::new(
            Metric::DebtToEquity,
            Below(0.0),
            Weakness,
            "Negative shareholder equity",
        ),
        AdvisoryRule::new(
            Metric::CurrentRatio,
            Below(1.0),
            Weakness,
            "Weak liquidity (current ratio {value})",
        ),
        AdvisoryRule::new(
            Metric::InterestCoverage,
            Below(2.0),
            Weakness,
            "Thin interest coverage ({value})",
        ),
        AdvisoryRule::new(
            Metric::PriceToEarnings,
            Above(40.0),
            Weakness,
            "Rich earnings multiple (P/E {value})",
        ),
        AdvisoryRule::new(
            Metric::PriceToEarnings,
            Below(0.0),
            Weakness,
            "Loss-making (negative P/E)",
        ),
        AdvisoryRule::new(
            Metric::PriceToBook,
            Above(10.0),
            Weakness,
            "Expensive relative to book value (P/B {value})",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_margin_ladder() {
        let policy = ScoringPolicy::default();
        let ladder = &policy.category(Category::Profitability).unwrap().ladders[0];
        assert_eq!(ladder.metric, Metric::NetMargin);
        let l = &ladder.ladder;
        assert_eq!(l.points(25.0), 25.0);
        assert_eq!(l.points(20.0), 20.0); // strict: 20 is not > 20
        assert_eq!(l.points(12.0), 20.0);
        assert_eq!(l.points(7.0), 15.0);
        assert_eq!(l.points(0.5), 10.0);
        assert_eq!(l.points(0.0), 0.0);
        assert_eq!(l.points(-3.0), 0.0);
        assert_eq!(l.points(f64::NAN), 0.0);
        assert_eq!(l.max_points(), 25.0);
    }

    #[test]
    fn test_lower_is_better_ladder_with_floor() {
        let l = Ladder::lower(&[(15.0, 35.0), (25.0, 25.0)]).with_floor(Floor::Above(0.0));
        assert_eq!(l.points(10.0), 35.0);
        assert_eq!(l.points(15.0), 25.0);
        assert_eq!(l.points(30.0), 0.0);
        assert_eq!(l.points(0.0), 0.0);
        assert_eq!(l.points(-8.0), 0.0);

        let de = Ladder::lower(&[(0.5, 35.0)]).with_floor(Floor::AtLeast(0.0));
        assert_eq!(de.points(0.0), 35.0);
        assert_eq!(de.points(-0.1), 0.0);
    }

    #[test]
    fn test_default_ladders_top_tier_fills_category() {
        let policy = ScoringPolicy::default();
        for cat in &policy.categories {
            let best: f64 = cat.ladders.iter().map(|l| l.ladder.max_points()).sum();
            assert!(
                (best - cat.max_points).abs() < 1e-9,
                "{:?} ladders top out at {} of {}",
                cat.category,
                best,
                cat.max_points
            );
        }
    }

    #[test]
    fn test_default_policy_valid() {
        assert!(ScoringPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let mut policy = ScoringPolicy::default();
        policy.categories[0].weight = 0.9;
        assert!(matches!(policy.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_unordered_ladder() {
        let mut policy = ScoringPolicy::default();
        policy.categories[0].ladders[0].ladder = Ladder::higher(&[(5.0, 10.0), (20.0, 25.0)]);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_misplaced_metric() {
        let mut policy = ScoringPolicy::default();
        policy.categories[0]
            .ladders
            .push(ladder(Metric::PriceToBook, Ladder::lower(&[(1.0, 5.0)])));
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_grade_steps() {
        let grades = GradeTable::default();
        assert_eq!(grades.grade(100.0), Grade::APlus);
        assert_eq!(grades.grade(95.0), Grade::APlus);
        assert_eq!(grades.grade(94.9), Grade::A);
        assert_eq!(grades.grade(85.0), Grade::AMinus);
        assert_eq!(grades.grade(72.0), Grade::BMinus);
        assert_eq!(grades.grade(60.0), Grade::C);
        assert_eq!(grades.grade(50.0), Grade::D);
        assert_eq!(grades.grade(49.9), Grade::F);
        assert_eq!(grades.grade(0.0), Grade::F);
    }

    #[test]
    fn test_grade_wire_format() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&Grade::CMinus).unwrap(), "\"C-\"");
        assert_eq!(Grade::BPlus.to_string(), "B+");
    }

    #[test]
    fn test_comparison_range_is_half_open() {
        let c = Comparison::InRange { min: 0.0, max: 0.5 };
        assert!(c.matches(0.0));
        assert!(c.matches(0.49));
        assert!(!c.matches(0.5));
        assert!(!c.matches(-0.1));
    }
}
