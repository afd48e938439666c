//! # Input Validation Utilities
//!
//! Custom validators used by request payloads through the `validator` derive.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// ISO 4217 style currency code: exactly three ASCII letters.
pub static CURRENCY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("Failed to compile currency regex"));

/// Validates a currency code such as `USD` or `eur`.
///
/// # Examples
///
/// - `validate_currency("USD")` ✓ Valid
/// - `validate_currency("usd")` ✓ Valid (normalized to upper case later)
/// - `validate_currency("US")` ✗ Invalid
pub fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if CURRENCY_REGEX.is_match(currency) {
        Ok(())
    } else {
        Err(ValidationError::new("currency")
            .with_message("currency must be a three-letter code".into()))
    }
}

/// Rejects strings that are empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("value cannot be blank".into()))
    } else {
        Ok(())
    }
}
