//! Provider payload -> canonical `FinancialSnapshot`.
//!
//! Providers rename ratio fields freely and disagree on whether margins are
//! fractions or percents. All of that is resolved here, before scoring.

use analysis_core::{FinancialSnapshot, Metric, MetricUnit, RawSnapshot, SnapshotAdapter};
use serde::{Deserialize, Serialize};

/// Treat `|value| > 1` as already in percent, anything else as a fraction.
///
/// Makes `0.25` and `25` the same "25%" input.
pub fn infer_percent(value: f64) -> f64 {
    if value.abs() > 1.0 {
        value
    } else {
        value * 100.0
    }
}

/// Ordered candidate field names for each canonical metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymTable {
    pub entries: Vec<(Metric, Vec<String>)>,
}

impl SynonymTable {
    pub fn synonyms(&self, metric: Metric) -> &[String] {
        self.entries
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, names)| names.as_slice())
            .unwrap_or(&[])
    }

    /// Put `field` ahead of the existing synonyms for `metric`.
    pub fn prepend(&mut self, metric: Metric, field: impl Into<String>) {
        let field = field.into();
        match self.entries.iter_mut().find(|(m, _)| *m == metric) {
            Some((_, names)) => names.insert(0, field),
            None => self.entries.push((metric, vec![field])),
        }
    }
}

impl Default for SynonymTable {
    /// Field names used by Finnhub (`metric` block), Financial Modeling Prep
    /// (`ratios-ttm`, `key-metrics-ttm`, `financial-growth`) and Alpha Vantage
    /// (`OVERVIEW`), plus plain snake/camel case.
    fn default() -> Self {
        #[rustfmt::skip]
        let table: &[(Metric, &[&str])] = &[
            (Metric::NetMargin, &[
                "netProfitMarginTTM", "netProfitMargin", "netMargin", "ProfitMargin",
                "netProfitMarginAnnual", "net_margin",
            ]),
            (Metric::ReturnOnEquity, &[
                "roeTTM", "returnOnEquityTTM", "returnOnEquity", "ReturnOnEquityTTM", "roeRfy",
                "roe", "return_on_equity",
            ]),
            (Metric::ReturnOnAssets, &[
                "roaTTM", "returnOnAssetsTTM", "returnOnAssets", "ReturnOnAssetsTTM", "roaRfy",
                "roa", "return_on_assets",
            ]),
            (Metric::GrossMargin, &[
                "grossMarginTTM", "grossProfitMarginTTM", "grossProfitMargin", "grossMargin",
                "grossMarginAnnual", "gross_margin",
            ]),
            (Metric::RevenueGrowth, &[
                "revenueGrowthTTMYoy", "revenueGrowth", "growthRevenue",
                "QuarterlyRevenueGrowthYOY", "revenueGrowthQuarterlyYoy", "revenue_growth",
            ]),
            (Metric::EpsGrowth, &[
                "epsGrowthTTMYoy", "epsgrowth", "epsGrowth", "growthEPS",
                "QuarterlyEarningsGrowthYOY", "epsGrowthQuarterlyYoy", "eps_growth",
            ]),
            (Metric::BookValueGrowth, &[
                "bookValueShareGrowth5Y", "bookValueperShareGrowth", "bookValuePerShareGrowth",
                "bookValueGrowth", "book_value_growth",
            ]),
            (Metric::DebtToEquity, &[
                "totalDebt/totalEquityQuarterly", "totalDebt/totalEquityAnnual",
                "debtEquityRatioTTM", "debtToEquityTTM", "debtEquityRatio", "debtToEquity",
                "debt_to_equity",
            ]),
            (Metric::CurrentRatio, &[
                "currentRatioQuarterly", "currentRatioAnnual", "currentRatioTTM", "currentRatio",
                "current_ratio",
            ]),
            (Metric::InterestCoverage, &[
                "netInterestCoverageTTM", "interestCoverageTTM", "interestCoverageRatioTTM",
                "interestCoverage", "interest_coverage",
            ]),
            (Metric::AssetTurnover, &[
                "assetTurnoverTTM", "assetTurnoverAnnual", "assetTurnover", "asset_turnover",
            ]),
            (Metric::InventoryTurnover, &[
                "inventoryTurnoverTTM", "inventoryTurnoverAnnual", "inventoryTurnover",
                "inventory_turnover",
            ]),
            (Metric::ReturnOnInvestedCapital, &[
                "roicTTM", "returnOnInvestedCapitalTTM", "roi5Y", "returnOnInvestedCapital",
                "roic",
            ]),
            (Metric::PriceToEarnings, &[
                "peTTM", "peBasicExclExtraTTM", "peRatioTTM", "priceEarningsRatioTTM", "PERatio",
                "TrailingPE", "peRatio", "pe",
            ]),
            (Metric::PriceToBook, &[
                "pbQuarterly", "pbAnnual", "priceToBookRatioTTM", "pbRatioTTM", "PriceToBookRatio",
                "priceToBookRatio", "pb",
            ]),
            (Metric::PriceToSales, &[
                "psTTM", "priceToSalesRatioTTM", "priceSalesRatioTTM", "PriceToSalesRatioTTM",
                "priceToSalesRatio", "ps",
            ]),
        ];

        Self {
            entries: table
                .iter()
                .map(|(metric, names)| (*metric, names.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }
}

/// Synonym-probing adapter for any provider whose payload is a flat ratio map.
#[derive(Debug, Clone)]
pub struct SnapshotNormalizer {
    provider: String,
    synonyms: SynonymTable,
}

impl SnapshotNormalizer {
    pub fn new(provider: impl Into<String>) -> Self {
        Self::with_synonyms(provider, SynonymTable::default())
    }

    pub fn with_synonyms(provider: impl Into<String>, synonyms: SynonymTable) -> Self {
        Self {
            provider: provider.into(),
            synonyms,
        }
    }

    /// First synonym with a usable numeric value, in table order. The flag
    /// is set when the value carried an explicit `%`.
    fn resolve(&self, raw: &RawSnapshot, metric: Metric) -> Option<(f64, bool)> {
        self.synonyms
            .synonyms(metric)
            .iter()
            .find_map(|field| raw.numeric_with_unit(field))
    }
}

impl SnapshotAdapter for SnapshotNormalizer {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn normalize(&self, raw: &RawSnapshot) -> FinancialSnapshot {
        let mut snapshot = FinancialSnapshot::default();
        for metric in Metric::ALL {
            let value = self.resolve(raw, metric).map(|(v, explicit_percent)| {
                match metric.unit() {
                    MetricUnit::Percent if !explicit_percent => infer_percent(v),
                    _ => v,
                }
            });
            snapshot.set(metric, value);
        }
        tracing::debug!(
            "Normalized {} snapshot: {}/{} metrics present",
            self.provider,
            snapshot.present_count(),
            Metric::ALL.len()
        );
        snapshot
    }
}
