//! Property-based tests for amount validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::amount::validate_amount;
use super::config::LedgerConfig;
use super::error::LedgerError;

/// Amounts from 0.01 to 99,999,999,999,999.99 with two fractional digits.
fn valid_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Amounts with exactly three significant fractional digits.
fn three_fractional_digits() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|units| Decimal::new(units * 10 + 1, 3) + Decimal::ONE)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every amount within the limits is accepted unchanged.
    #[test]
    fn prop_valid_amount_accepted(amount in valid_amount()) {
        let config = LedgerConfig::default();
        prop_assert_eq!(validate_amount(&amount.to_string(), &config), Ok(amount));
    }

    /// Trailing zeros never make a valid amount invalid.
    #[test]
    fn prop_trailing_zeros_ignored(amount in valid_amount(), zeros in 1usize..6) {
        let config = LedgerConfig::default();
        let raw = format!("{amount}{}", "0".repeat(zeros));
        prop_assert_eq!(validate_amount(&raw, &config), Ok(amount));
    }

    /// Any negative amount is rejected as negative, whatever its size.
    #[test]
    fn prop_negative_rejected(amount in valid_amount()) {
        let config = LedgerConfig::default();
        prop_assert_eq!(
            validate_amount(&(-amount).to_string(), &config),
            Err(LedgerError::NegativeAmount)
        );
    }

    /// A third significant fractional digit is always rejected.
    #[test]
    fn prop_third_fractional_digit_rejected(amount in three_fractional_digits()) {
        let config = LedgerConfig::default();
        prop_assert_eq!(
            validate_amount(&amount.to_string(), &config),
            Err(LedgerError::ExcessiveFractionalDigits { max: 2 })
        );
    }

    /// Accepted amounts always fit below the storable bound.
    #[test]
    fn prop_accepted_amount_below_storable_bound(amount in valid_amount()) {
        let config = LedgerConfig::default();
        if let Ok(accepted) = validate_amount(&amount.to_string(), &config) {
            prop_assert!(accepted < config.storable_bound());
        }
    }
}
