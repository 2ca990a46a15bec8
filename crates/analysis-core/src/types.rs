use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AnalysisError;

/// Company financial statement values, as reported.
///
/// Used when a provider only exposes statements; ratios are derived from
/// these by the fundamental-analysis crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Financials {
    pub symbol: String,
    pub fiscal_period: String,
    pub fiscal_year: i32,
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub shareholders_equity: Option<f64>,
    #[serde(default)]
    pub current_assets: Option<f64>,
    #[serde(default)]
    pub current_liabilities: Option<f64>,
    #[serde(default)]
    pub interest_expense: Option<f64>,
}

/// The five scoring categories of the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Profitability,
    Growth,
    Stability,
    Efficiency,
    Valuation,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Profitability,
        Category::Growth,
        Category::Stability,
        Category::Efficiency,
        Category::Valuation,
    ];
}

/// Unit a metric is expressed in once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    /// Stored in percent units (25.0 = 25%). Raw provider values are
    /// scale-inferred: |v| > 1 is already percent, otherwise a fraction.
    Percent,
    /// Plain multiple or ratio (P/E, D/E, turnover). Never rescaled.
    Ratio,
}

/// Canonical financial metric understood by the health scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NetMargin,
    ReturnOnEquity,
    ReturnOnAssets,
    GrossMargin,
    RevenueGrowth,
    EpsGrowth,
    BookValueGrowth,
    DebtToEquity,
    CurrentRatio,
    InterestCoverage,
    AssetTurnover,
    InventoryTurnover,
    ReturnOnInvestedCapital,
    PriceToEarnings,
    PriceToBook,
    PriceToSales,
}

impl Metric {
    pub const ALL: [Metric; 16] = [
        Metric::NetMargin,
        Metric::ReturnOnEquity,
        Metric::ReturnOnAssets,
        Metric::GrossMargin,
        Metric::RevenueGrowth,
        Metric::EpsGrowth,
        Metric::BookValueGrowth,
        Metric::DebtToEquity,
        Metric::CurrentRatio,
        Metric::InterestCoverage,
        Metric::AssetTurnover,
        Metric::InventoryTurnover,
        Metric::ReturnOnInvestedCapital,
        Metric::PriceToEarnings,
        Metric::PriceToBook,
        Metric::PriceToSales,
    ];

    pub fn category(&self) -> Category {
        match self {
            Metric::NetMargin
            | Metric::ReturnOnEquity
            | Metric::ReturnOnAssets
            | Metric::GrossMargin => Category::Profitability,
            Metric::RevenueGrowth | Metric::EpsGrowth | Metric::BookValueGrowth => Category::Growth,
            Metric::DebtToEquity | Metric::CurrentRatio | Metric::InterestCoverage => {
                Category::Stability
            }
            Metric::AssetTurnover
            | Metric::InventoryTurnover
            | Metric::ReturnOnInvestedCapital => Category::Efficiency,
            Metric::PriceToEarnings | Metric::PriceToBook | Metric::PriceToSales => {
                Category::Valuation
            }
        }
    }

    pub fn unit(&self) -> MetricUnit {
        match self {
            Metric::NetMargin
            | Metric::ReturnOnEquity
            | Metric::ReturnOnAssets
            | Metric::GrossMargin
            | Metric::RevenueGrowth
            | Metric::EpsGrowth
            | Metric::BookValueGrowth
            | Metric::ReturnOnInvestedCapital => MetricUnit::Percent,
            _ => MetricUnit::Ratio,
        }
    }

    /// Human-readable label for advisory text and logs
    pub fn label(&self) -> &'static str {
        match self {
            Metric::NetMargin => "Net margin",
            Metric::ReturnOnEquity => "Return on equity",
            Metric::ReturnOnAssets => "Return on assets",
            Metric::GrossMargin => "Gross margin",
            Metric::RevenueGrowth => "Revenue growth",
            Metric::EpsGrowth => "EPS growth",
            Metric::BookValueGrowth => "Book value growth",
            Metric::DebtToEquity => "Debt to equity",
            Metric::CurrentRatio => "Current ratio",
            Metric::InterestCoverage => "Interest coverage",
            Metric::AssetTurnover => "Asset turnover",
            Metric::InventoryTurnover => "Inventory turnover",
            Metric::ReturnOnInvestedCapital => "Return on invested capital",
            Metric::PriceToEarnings => "P/E ratio",
            Metric::PriceToBook => "P/B ratio",
            Metric::PriceToSales => "P/S ratio",
        }
    }
}

/// Canonical, provider-independent view of a company's financial ratios.
///
/// `Percent` metrics are in percent units, `Ratio` metrics are plain
/// multiples. `None` means the metric is absent, which is never the same
/// as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    pub net_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub gross_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub eps_growth: Option<f64>,
    pub book_value_growth: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub asset_turnover: Option<f64>,
    pub inventory_turnover: Option<f64>,
    pub return_on_invested_capital: Option<f64>,
    pub price_to_earnings: Option<f64>,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
}

impl FinancialSnapshot {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::NetMargin => self.net_margin,
            Metric::ReturnOnEquity => self.return_on_equity,
            Metric::ReturnOnAssets => self.return_on_assets,
            Metric::GrossMargin => self.gross_margin,
            Metric::RevenueGrowth => self.revenue_growth,
            Metric::EpsGrowth => self.eps_growth,
            Metric::BookValueGrowth => self.book_value_growth,
            Metric::DebtToEquity => self.debt_to_equity,
            Metric::CurrentRatio => self.current_ratio,
            Metric::InterestCoverage => self.interest_coverage,
            Metric::AssetTurnover => self.asset_turnover,
            Metric::InventoryTurnover => self.inventory_turnover,
            Metric::ReturnOnInvestedCapital => self.return_on_invested_capital,
            Metric::PriceToEarnings => self.price_to_earnings,
            Metric::PriceToBook => self.price_to_book,
            Metric::PriceToSales => self.price_to_sales,
        }
        .filter(|v| v.is_finite())
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        let slot = match metric {
            Metric::NetMargin => &mut self.net_margin,
            Metric::ReturnOnEquity => &mut self.return_on_equity,
            Metric::ReturnOnAssets => &mut self.return_on_assets,
            Metric::GrossMargin => &mut self.gross_margin,
            Metric::RevenueGrowth => &mut self.revenue_growth,
            Metric::EpsGrowth => &mut self.eps_growth,
            Metric::BookValueGrowth => &mut self.book_value_growth,
            Metric::DebtToEquity => &mut self.debt_to_equity,
            Metric::CurrentRatio => &mut self.current_ratio,
            Metric::InterestCoverage => &mut self.interest_coverage,
            Metric::AssetTurnover => &mut self.asset_turnover,
            Metric::InventoryTurnover => &mut self.inventory_turnover,
            Metric::ReturnOnInvestedCapital => &mut self.return_on_invested_capital,
            Metric::PriceToEarnings => &mut self.price_to_earnings,
            Metric::PriceToBook => &mut self.price_to_book,
            Metric::PriceToSales => &mut self.price_to_sales,
        };
        *slot = value;
    }

    /// Builder-style `set`.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, Some(value));
        self
    }

    /// Number of metrics present.
    pub fn present_count(&self) -> usize {
        Metric::ALL.iter().filter(|m| self.get(**m).is_some()).count()
    }

    /// Fill every absent metric from `fallback`, leaving present ones untouched.
    pub fn fill_missing_from(&mut self, fallback: &FinancialSnapshot) {
        for metric in Metric::ALL {
            if self.get(metric).is_none() {
                self.set(metric, fallback.get(metric));
            }
        }
    }
}

/// Raw provider payload: an open map of field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSnapshot(pub Map<String, Value>);

impl RawSnapshot {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parse a provider response body. Only a JSON object is accepted.
    pub fn from_json_str(body: &str) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AnalysisError::InvalidData(format!("malformed snapshot JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, AnalysisError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AnalysisError::InvalidData(format!(
                "snapshot must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Numeric value of `key`, if present and parseable.
    ///
    /// Accepts JSON numbers and numeric strings (surrounding whitespace and
    /// a trailing `%` are tolerated). NaN, infinities, booleans, nulls and
    /// anything else are treated as absent.
    pub fn numeric(&self, key: &str) -> Option<f64> {
        self.numeric_with_unit(key).map(|(value, _)| value)
    }

    /// Like [`numeric`](Self::numeric), also reporting whether the value
    /// carried an explicit `%` suffix and is therefore already in percent.
    pub fn numeric_with_unit(&self, key: &str) -> Option<(f64, bool)> {
        let (value, percent) = match self.0.get(key)? {
            Value::Number(n) => (n.as_f64(), false),
            Value::String(s) => {
                let trimmed = s.trim();
                match trimmed.strip_suffix('%') {
                    Some(number) => (number.trim_end().parse::<f64>().ok(), true),
                    None => (trimmed.parse::<f64>().ok(), false),
                }
            }
            _ => (None, false),
        };
        value.filter(|v| v.is_finite()).map(|v| (v, percent))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
