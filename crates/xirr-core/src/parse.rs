//! Typed parsing of form text into money and dates.
//!
//! Blank input is not an error here: it comes back as `Ok(None)` and the
//! builder decides whether a missing value is acceptable.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ParseError;
use crate::types::Money;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse an amount such as `"100000"`, `"1,250.75"` or `"20 000"`.
///
/// Commas, underscores and spaces are digit-group separators only between
/// two digits of the mantissa. Anywhere else, including the exponent, they
/// make the amount invalid.
pub fn parse_amount(text: &str) -> Result<Option<Money>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let invalid = || ParseError::InvalidNumber(trimmed.to_string());

    let (mantissa, exponent) = match trimmed.find(['e', 'E']) {
        Some(pos) => trimmed.split_at(pos),
        None => (trimmed, ""),
    };
    let mut cleaned = strip_group_separators(mantissa);
    cleaned.push_str(exponent);

    if cleaned.contains(is_separator) || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let parsed = if exponent.is_empty() {
        Decimal::from_str(&cleaned)
    } else {
        Decimal::from_scientific(&cleaned)
    };

    parsed.map(Some).map_err(|_| invalid())
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '_' | ' ')
}

fn strip_group_separators(mantissa: &str) -> String {
    let chars: Vec<char> = mantissa.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| {
            let grouped = is_separator(c)
                && i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            !grouped
        })
        .map(|(_, &c)| c)
        .collect()
}

/// Parse a calendar date in `YYYY-MM-DD` (or `YYYY/MM/DD`) form.
pub fn parse_date(text: &str) -> Result<Option<NaiveDate>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(Some)
        .ok_or_else(|| ParseError::InvalidDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_is_none() {
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount("   ").unwrap(), None);
        assert_eq!(parse_date("").unwrap(), None);
    }

    #[test]
    fn test_amount_with_separators() {
        assert_eq!(parse_amount("100000").unwrap(), Some(dec!(100000)));
        assert_eq!(parse_amount("1,250.75").unwrap(), Some(dec!(1250.75)));
        assert_eq!(parse_amount(" 20 000 ").unwrap(), Some(dec!(20000)));
        assert_eq!(parse_amount("-5").unwrap(), Some(dec!(-5)));
        assert_eq!(parse_amount("1.5e3").unwrap(), Some(dec!(1500)));
    }

    #[test]
    fn test_amount_rejects_garbage() {
        assert!(matches!(parse_amount("abc"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse_amount("NaN"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse_amount("inf"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse_amount("$100"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse_amount(",,"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse_amount("1.2.3"), Err(ParseError::InvalidNumber(_))));
    }

    #[test]
    fn test_separators_only_between_mantissa_digits() {
        assert_eq!(parse_amount("1_000e2").unwrap(), Some(dec!(100000)));
        for bad in ["1_e_2", "1e_2", "1_e2", "1e 2", "1,,000", ",100", "100,"] {
            assert!(
                matches!(parse_amount(bad), Err(ParseError::InvalidNumber(_))),
                "input {bad}"
            );
        }
    }

    #[test]
    fn test_dates() {
        let d = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        assert_eq!(parse_date("2023-07-01").unwrap(), Some(d));
        assert_eq!(parse_date("2023/07/01").unwrap(), Some(d));
        assert!(matches!(parse_date("2023-02-30"), Err(ParseError::InvalidDate(_))));
        assert!(matches!(parse_date("01/07/2023"), Err(ParseError::InvalidDate(_))));
    }
}
