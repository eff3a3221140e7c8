//! Request field validation. Each check returns the normalized value or a
//! validation error naming the field.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::error::AppError;

pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 100;
pub const ADDRESS_MAX: usize = 255;

/// Largest value a `NUMERIC(10, 2)` column holds.
pub const PRICE_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn email_pattern() -> Result<&'static Regex, AppError> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .ok_or_else(|| AppError::Internal("invalid email pattern".into()))
}

/// Trimmed, non-empty, at most `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

pub fn email(field: &str, value: &str) -> Result<String, AppError> {
    let value = required_text(field, value, EMAIL_MAX)?;
    if !email_pattern()?.is_match(&value) {
        return Err(AppError::Validation(format!("{} must be a valid email", field)));
    }
    Ok(value)
}

/// Passwords are not trimmed; only emptiness is rejected.
pub fn password(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Non-negative, rounded to cents, at most [`PRICE_MAX`].
pub fn price(field: &str, value: Decimal) -> Result<Decimal, AppError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("{} must not be negative", field)));
    }
    let rounded = value.round_dp(2);
    if rounded > PRICE_MAX {
        return Err(AppError::Validation(format!(
            "{} must be at most {}",
            field, PRICE_MAX
        )));
    }
    Ok(rounded)
}

pub fn positive_i32(field: &str, value: i32) -> Result<i32, AppError> {
    if value <= 0 {
        return Err(AppError::Validation(format!("{} must be positive", field)));
    }
    Ok(value)
}

pub fn positive_i64(field: &str, value: i64) -> Result<i64, AppError> {
    if value <= 0 {
        return Err(AppError::Validation(format!("{} must be positive", field)));
    }
    Ok(value)
}

/// Three ASCII letters, returned lowercase.
pub fn currency(field: &str, value: &str) -> Result<String, AppError> {
    let code = value.trim().to_ascii_lowercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(AppError::Validation(format!(
            "{} must be a three-letter currency code",
            field
        )));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(required_text("name", "  Pizza Place ", NAME_MAX).unwrap(), "Pizza Place");
        assert!(required_text("name", "   ", NAME_MAX).is_err());
        assert!(required_text("name", &"x".repeat(101), NAME_MAX).is_err());
        assert!(required_text("name", &"x".repeat(100), NAME_MAX).is_ok());
    }

    #[test]
    fn email_format() {
        assert_eq!(email("email", "alice@example.com").unwrap(), "alice@example.com");
        for bad in ["alice", "alice@", "@example.com", "a b@example.com", "alice@example"] {
            assert!(email("email", bad).is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn price_rules() {
        assert_eq!(price("price", Decimal::new(999, 2)).unwrap(), Decimal::new(999, 2));
        assert_eq!(price("price", Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert_eq!(price("price", Decimal::new(9999, 3)).unwrap(), Decimal::new(1000, 2));
        assert!(price("price", Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn price_fits_numeric_10_2() {
        assert_eq!(PRICE_MAX, Decimal::new(9_999_999_999, 2));
        assert_eq!(price("price", PRICE_MAX).unwrap(), PRICE_MAX);
        assert!(price("price", Decimal::new(100_000_000, 0)).is_err());
        assert!(price("price", Decimal::new(1_000_000_000, 0)).is_err());
        assert!(price("price", Decimal::new(99_999_999_999, 3)).is_err());
    }

    #[test]
    fn quantities_and_amounts_must_be_positive() {
        assert!(positive_i32("quantity", 0).is_err());
        assert!(positive_i32("quantity", -3).is_err());
        assert_eq!(positive_i32("quantity", 2).unwrap(), 2);
        assert!(positive_i64("amount", 0).is_err());
        assert_eq!(positive_i64("amount", 1998).unwrap(), 1998);
    }

    #[test]
    fn currency_codes() {
        assert_eq!(currency("currency", "USD").unwrap(), "usd");
        assert_eq!(currency("currency", " eur ").unwrap(), "eur");
        assert!(currency("currency", "us").is_err());
        assert!(currency("currency", "u5d").is_err());
    }

    #[test]
    fn error_names_the_field() {
        let err = required_text("address", "", ADDRESS_MAX).unwrap_err();
        assert_eq!(err.to_string(), "address is required");
    }
}
