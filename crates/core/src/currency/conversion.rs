//! Currency conversion arithmetic.
//!
//! CRITICAL: Rounding strategy for converted balances:
//! - Always round to two decimal places
//! - Use banker's rounding (round half to even)
//! - Never persist the converted figure

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Decimal places of a converted balance.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Converts `amount` at `rate` (1 native = `rate` target).
///
/// Returns `None` if the product does not fit a `Decimal`.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|converted| {
            converted.round_dp_with_strategy(
                DISPLAY_DECIMAL_PLACES,
                RoundingStrategy::MidpointNearestEven,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_amount() {
        // 750 RUB * 0.0135 = 10.125 USD -> 10.12
        assert_eq!(convert_amount(dec!(750), dec!(0.0135)), Some(dec!(10.12)));
    }

    #[test]
    fn test_bankers_rounding() {
        assert_eq!(convert_amount(dec!(1), dec!(0.125)), Some(dec!(0.12)));
        assert_eq!(convert_amount(dec!(1), dec!(0.135)), Some(dec!(0.14)));
    }

    #[test]
    fn test_zero_amount() {
        assert_eq!(convert_amount(dec!(0), dec!(0.0135)), Some(dec!(0)));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(convert_amount(Decimal::MAX, dec!(2)), None);
    }
}
