use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{Years, DAYS_PER_YEAR};

/// Actual days from `from` to `to` over a fixed 365-day year, for discounting.
pub fn year_fraction(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR as f64
}

/// Same day count as [`year_fraction`], in decimal for reporting.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> Years {
    Decimal::from((to - from).num_days()) / Decimal::from(DAYS_PER_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_leap_year_adjustment() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        // 2024 has 366 days
        assert_eq!(years_between(from, to), dec!(366) / dec!(365));
        assert!((year_fraction(from, to) - 366.0 / 365.0).abs() < 1e-15);
    }

    #[test]
    fn test_backwards_is_negative() {
        let from = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        assert!(year_fraction(from, to) < 0.0);
    }
}
