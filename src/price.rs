use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::utils::error::{AppError, Result};

/// Currency glyphs stripped before parsing.
const CURRENCY_GLYPHS: [char; 5] = ['₹', '$', '£', '€', '¥'];

/// Converts a raw price representation into a canonical non-negative integer.
///
/// Strips currency glyphs and grouping separators, parses the remainder as a
/// decimal, and rounds to the nearest integer. Pure and idempotent:
/// normalizing an already-normalized integer returns the same integer.
///
/// Fails with [`AppError::InvalidPrice`] when the cleaned string does not
/// parse or the value is negative. Callers must treat this as a recoverable,
/// per-item condition.
pub fn normalize_price(raw: &str) -> Result<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !CURRENCY_GLYPHS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    let invalid = || AppError::InvalidPrice {
        raw: raw.to_string(),
    };

    if cleaned.is_empty() {
        return Err(invalid());
    }

    let value = Decimal::from_str(&cleaned).map_err(|_| invalid())?;
    if value.is_sign_negative() {
        return Err(invalid());
    }

    value.round().to_i64().ok_or_else(invalid)
}

/// The single alert-decision policy shared by the monitor and the
/// add/update watch flows. Both inputs must already be normalized.
pub fn alert_condition(current: i64, target: i64) -> bool {
    current <= target
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("₹1,234", 1234)]
    #[case("1234.00", 1234)]
    #[case("1234", 1234)]
    #[case("$ 2,499.99", 2500)]
    #[case("€50.00", 50)]
    #[case("  799  ", 799)]
    #[case("0", 0)]
    fn test_normalize_strips_glyphs_and_separators(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(normalize_price(raw).unwrap(), expected);
    }

    #[test]
    fn test_normalize_matches_unformatted_equivalent() {
        assert_eq!(
            normalize_price("₹1,234").unwrap(),
            normalize_price("1234").unwrap()
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_price("₹12,345.67").unwrap();
        let twice = normalize_price(&once.to_string()).unwrap();
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("₹")]
    #[case("12a4")]
    #[case("-500")]
    fn test_normalize_rejects_garbage(#[case] raw: &str) {
        assert!(matches!(
            normalize_price(raw),
            Err(AppError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_alert_condition_boundary() {
        assert!(alert_condition(4400, 4500));
        assert!(alert_condition(4500, 4500));
        assert!(!alert_condition(4501, 4500));
    }
}
