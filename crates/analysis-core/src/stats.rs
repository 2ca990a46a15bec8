//! Descriptive statistics shared by the valuation, scoring and backtest engines.
//!
//! Every function is total: empty input (or input that is empty once
//! non-finite values are dropped) yields 0.0 instead of NaN.

use statrs::statistics::Statistics;

fn finite(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> f64 {
    let values = finite(data);
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Population variance (divides by N, not N - 1).
pub fn population_variance(data: &[f64]) -> f64 {
    let values = finite(data);
    if values.is_empty() {
        return 0.0;
    }
    values.iter().population_variance()
}

/// Population standard deviation.
pub fn population_std_dev(data: &[f64]) -> f64 {
    population_variance(data).sqrt()
}

/// Percentile `p` (0-100) with linear interpolation between closest ranks.
pub fn percentile(data: &[f64], p: f64) -> f64 {
    let mut sorted = finite(data);
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let p = if p.is_nan() { 50.0 } else { p.clamp(0.0, 100.0) };
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn median(data: &[f64]) -> f64 {
    percentile(data, 50.0)
}

/// Population covariance over the common prefix of `a` and `b`.
/// Pairs where either side is non-finite are skipped.
pub fn population_covariance(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    pairs
        .iter()
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_population_std_dev_divides_by_n() {
        // Classic example: population stdev of this set is exactly 2.
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_variance(&data) - 4.0).abs() < 1e-12);
        assert!((population_std_dev(&data) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_has_zero_spread() {
        assert_eq!(population_std_dev(&[42.0]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let data = vec![1.0, f64::NAN, 3.0, f64::INFINITY];
        assert!((mean(&data) - 2.0).abs() < 1e-12);
        assert!((population_variance(&data) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((percentile(&data, 0.0) - 10.0).abs() < 1e-12);
        assert!((percentile(&data, 100.0) - 50.0).abs() < 1e-12);
        assert!((percentile(&data, 50.0) - 30.0).abs() < 1e-12);
        assert!((percentile(&data, 25.0) - 20.0).abs() < 1e-12);
        assert!((percentile(&data, 10.0) - 14.0).abs() < 1e-12);
        // Out-of-range p is clamped
        assert!((percentile(&data, 150.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_median_unsorted_even() {
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < 1e-12);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_population_covariance() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![2.0, 4.0, 6.0];
        // cov = 2 * var(a) = 2 * 2/3
        assert!((population_covariance(&a, &b) - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(population_covariance(&[1.0], &[2.0]), 0.0);
    }
}
