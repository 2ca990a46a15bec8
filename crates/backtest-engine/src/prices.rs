use chrono::NaiveDate;

use crate::dates::parse_date;
use crate::models::PricePoint;

/// Earliest point dated on or after `target`. Points with unparsable dates or
/// non-finite prices are skipped; on equal dates the first one in the series wins.
pub fn price_on_or_after(points: &[PricePoint], target: NaiveDate) -> Option<&PricePoint> {
    let mut best: Option<(NaiveDate, &PricePoint)> = None;
    for point in points {
        if !point.price.is_finite() {
            continue;
        }
        let Some(date) = parse_date(&point.date) else {
            continue;
        };
        if date < target {
            continue;
        }
        match best {
            Some((best_date, _)) if best_date <= date => {}
            _ => best = Some((date, point)),
        }
    }
    best.map(|(_, point)| point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_exact_and_next_available() {
        let series = vec![
            PricePoint::new("2024-01-02", 101.0),
            PricePoint::new("2024-01-05", 104.0),
            PricePoint::new("2024-01-08", 107.0),
        ];
        assert_eq!(price_on_or_after(&series, day("2024-01-05")).unwrap().price, 104.0);
        // weekend gap rolls forward
        assert_eq!(price_on_or_after(&series, day("2024-01-06")).unwrap().price, 107.0);
        assert!(price_on_or_after(&series, day("2024-01-09")).is_none());
    }

    #[test]
    fn test_unsorted_series() {
        let series = vec![
            PricePoint::new("2024-03-01", 130.0),
            PricePoint::new("2024-01-15", 115.0),
            PricePoint::new("2024-02-01", 120.0),
        ];
        assert_eq!(price_on_or_after(&series, day("2024-01-10")).unwrap().price, 115.0);
    }

    #[test]
    fn test_skips_bad_points() {
        let series = vec![
            PricePoint::new("not a date", 1.0),
            PricePoint::new("2024-01-03", f64::NAN),
            PricePoint::new("2024-01-04", 99.0),
        ];
        assert_eq!(price_on_or_after(&series, day("2024-01-01")).unwrap().price, 99.0);
        assert!(price_on_or_after(&[], day("2024-01-01")).is_none());
    }
}
