//! Fallback estimators for inputs providers often leave out.

use std::collections::HashMap;

fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup(table: &HashMap<String, f64>, key: &str) -> Option<f64> {
    let key = normalize_key(key);
    table.get(&key).copied().or_else(|| {
        // "Technology Hardware & Equipment" style names fall back to the longest
        // table entry that prefixes them.
        table
            .iter()
            .filter(|(k, _)| key.starts_with(k.as_str()))
            .max_by_key(|(k, _)| k.len())
            .map(|(_, v)| *v)
    })
}

/// Sector beta, or `default` for an unknown sector.
pub fn estimate_beta(table: &HashMap<String, f64>, sector: &str, default: f64) -> f64 {
    lookup(table, sector).unwrap_or_else(|| {
        tracing::debug!("Unknown sector {:?}, using market beta {}", sector, default);
        default
    })
}

/// Corporate tax rate for a country name or ISO code, or `default`.
pub fn estimate_tax_rate(table: &HashMap<String, f64>, country: &str, default: f64) -> f64 {
    // Prefix matching would turn "in" into a catch-all, so countries are exact.
    table.get(&normalize_key(country)).copied().unwrap_or_else(|| {
        tracing::debug!("Unknown country {:?}, using default tax rate {}", country, default);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::ValuationConfig;

    #[test]
    fn test_known_sector_case_insensitive() {
        let config = ValuationConfig::default();
        assert_eq!(estimate_beta(&config.sector_betas, "Utilities", 1.0), 0.5);
        assert_eq!(estimate_beta(&config.sector_betas, "  TECHNOLOGY ", 1.0), 1.25);
        assert_eq!(estimate_beta(&config.sector_betas, "consumer_defensive", 1.0), 0.7);
    }

    #[test]
    fn test_sector_prefix_match() {
        let config = ValuationConfig::default();
        assert_eq!(
            estimate_beta(&config.sector_betas, "Energy Equipment & Services", 1.0),
            1.1
        );
    }

    #[test]
    fn test_unknown_sector_defaults_to_market() {
        let config = ValuationConfig::default();
        assert_eq!(estimate_beta(&config.sector_betas, "Shell Companies", 1.0), 1.0);
        assert_eq!(estimate_beta(&config.sector_betas, "", 1.0), 1.0);
    }

    #[test]
    fn test_tax_rate_lookup() {
        let config = ValuationConfig::default();
        assert_eq!(estimate_tax_rate(&config.country_tax_rates, "US", 0.25), 0.21);
        assert_eq!(
            estimate_tax_rate(&config.country_tax_rates, "United States", 0.25),
            0.21
        );
        assert_eq!(estimate_tax_rate(&config.country_tax_rates, "ie", 0.25), 0.125);
        assert_eq!(estimate_tax_rate(&config.country_tax_rates, "Atlantis", 0.25), 0.25);
        assert_eq!(estimate_tax_rate(&config.country_tax_rates, "Indonesia", 0.25), 0.25);
    }
}
