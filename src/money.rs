//! Money formatting

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors resolving a display currency.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// The code is not a known ISO 4217 currency.
    #[error("unknown currency code: {0}")]
    Unknown(String),
}

/// Look up an ISO 4217 currency by its alphabetic code.
///
/// # Errors
///
/// Returns [`CurrencyError::Unknown`] when the code is not recognised.
pub fn currency(code: &str) -> Result<&'static Currency, CurrencyError> {
    iso::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| CurrencyError::Unknown(code.to_string()))
}

/// Render an amount the way totals and subtotals are displayed, e.g. `$25.00`.
pub fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
    let rounded = amount.round_dp(currency.exponent);

    Money::from_decimal(rounded, currency).to_string()
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn amounts_render_with_symbol_and_two_places() {
        assert_eq!(format_amount(Decimal::new(25, 0), USD), "$25.00");
        assert_eq!(format_amount(Decimal::new(7500, 2), USD), "$75.00");
    }

    #[test]
    fn amounts_round_to_the_currency_exponent() {
        assert_eq!(format_amount(Decimal::new(12_346, 3), GBP), "£12.35");
    }

    #[test]
    fn currency_codes_are_case_insensitive() -> TestResult {
        assert_eq!(currency("usd")?, USD);

        Ok(())
    }

    #[test]
    fn unknown_currency_codes_are_rejected() {
        assert_eq!(
            currency("XYZ1"),
            Err(CurrencyError::Unknown("XYZ1".to_string()))
        );
    }
}
