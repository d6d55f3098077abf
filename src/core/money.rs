//! Amount parsing and currency formatting.
//!
//! Staff type amounts the Brazilian way (`1.234,56`) as often as the plain way
//! (`1234.56`); both are accepted.

use crate::errors::{Error, Result};

/// Rejects negative, NaN and infinite amounts.
pub fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Parses a user-entered amount.
///
/// An optional `R$` prefix is ignored. When the input contains a comma, the comma is
/// the decimal separator and dots are thousands separators.
///
/// # Errors
/// * `Validation` if the input is blank or not a number
/// * `InvalidAmount` if the number is negative or not finite
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Total amount is required"));
    }

    let cleaned = trimmed.trim_start_matches("R$").trim();
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };

    let amount: f64 = normalized
        .parse()
        .map_err(|_| Error::validation(format!("'{trimmed}' is not a valid amount")))?;
    validate_amount(amount)
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
#[must_use]
pub fn format_currency(value: f64) -> String {
    // Cast safety: amounts are shop-sized, far below u64::MAX cents.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction:02}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_amount_plain_and_brazilian() {
        assert_eq!(parse_amount("500").unwrap(), 500.0);
        assert_eq!(parse_amount("500.00").unwrap(), 500.0);
        assert_eq!(parse_amount("500,50").unwrap(), 500.5);
        assert_eq!(parse_amount("R$ 1.234,56").unwrap(), 1234.56);
        assert_eq!(parse_amount("  0 ").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_amount_rejects_blank() {
        let err = parse_amount("   ").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.to_string(), "Total amount is required");
    }

    #[test]
    fn test_parse_amount_rejects_garbage_and_negative() {
        assert!(matches!(
            parse_amount("abc").unwrap_err(),
            Error::Validation { .. }
        ));
        assert!(matches!(
            parse_amount("-10").unwrap_err(),
            Error::InvalidAmount { amount: -10.0 }
        ));
        assert!(matches!(
            parse_amount("inf").unwrap_err(),
            Error::InvalidAmount { .. }
        ));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(175.0), "R$ 175,00");
        assert_eq!(format_currency(1234.56), "R$ 1.234,56");
        assert_eq!(format_currency(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_currency(-25.5), "-R$ 25,50");
    }
}
