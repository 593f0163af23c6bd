//! Amount validation.
//!
//! Amounts arrive as decimal strings and are checked in a fixed order:
//! format, sign, minimum unit, fractional digits, whole digits. The first
//! failing rule wins. Digits are counted on the text, so an amount too
//! long for a `Decimal` still gets the digit error rather than being
//! rounded.

use rust_decimal::Decimal;

use super::config::LedgerConfig;
use super::error::LedgerError;

/// Significant digits a `Decimal` always holds without rounding.
const EXACT_PRECISION: usize = 28;

/// Parses and validates an operation amount.
///
/// The accepted grammar is `[+-]?digits[.digits]`. Fractional digits are
/// counted without trailing zeros, so `"10.500"` has one. Whole digits are
/// counted after rounding half away from zero, so `"999.5"` has four.
///
/// # Errors
///
/// Returns the first violated rule as a validation [`LedgerError`].
pub fn validate_amount(raw: &str, config: &LedgerConfig) -> Result<Decimal, LedgerError> {
    let invalid = || LedgerError::InvalidAmountFormat(raw.to_string());
    let text = AmountText::parse(raw).ok_or_else(invalid)?;

    if text.negative && !text.is_zero() {
        return Err(LedgerError::NegativeAmount);
    }

    let exact = text.exact();
    if exact.unwrap_or_else(|| text.truncated()) < config.min_monetary_unit() {
        return Err(LedgerError::AmountBelowMinimum {
            minimum: config.min_monetary_unit(),
        });
    }

    let max_fractional = config.max_fractional_digits();
    if text.fractional_digits() > max_fractional {
        return Err(LedgerError::ExcessiveFractionalDigits {
            max: max_fractional,
        });
    }

    let max_whole = config.max_whole_digits();
    if text.whole_digits() > max_whole {
        return Err(LedgerError::ExcessiveWholeDigits { max: max_whole });
    }

    // Only reachable when the digit limits together exceed `Decimal` precision.
    exact.ok_or_else(invalid)
}

/// A well-formed amount, without leading whole zeros or trailing
/// fractional zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AmountText<'a> {
    negative: bool,
    whole: &'a str,
    fraction: &'a str,
    /// First fractional digit is 5 or more.
    rounds_up: bool,
}

impl<'a> AmountText<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let (negative, unsigned) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };

        let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole) || fraction.is_some_and(|f| !is_digits(f)) {
            return None;
        }
        let fraction = fraction.unwrap_or_default();

        Some(Self {
            negative,
            whole: whole.trim_start_matches('0'),
            fraction: fraction.trim_end_matches('0'),
            rounds_up: fraction.as_bytes().first().is_some_and(|&b| b >= b'5'),
        })
    }

    fn is_zero(&self) -> bool {
        self.whole.is_empty() && self.fraction.is_empty()
    }

    fn fractional_digits(&self) -> u32 {
        u32::try_from(self.fraction.len()).unwrap_or(u32::MAX)
    }

    /// Digits before the decimal point once rounded to an integer.
    fn whole_digits(&self) -> u32 {
        let carries =
            self.rounds_up && !self.whole.is_empty() && self.whole.bytes().all(|b| b == b'9');
        let digits = self.whole.len().max(1) + usize::from(carries);
        u32::try_from(digits).unwrap_or(u32::MAX)
    }

    /// Absolute value, if it fits a `Decimal` without rounding.
    fn exact(&self) -> Option<Decimal> {
        Self::decimal(self.whole, self.fraction)
    }

    /// Absolute value with the fraction cut to what a `Decimal` holds.
    ///
    /// Never above the exact value, and saturates for huge whole parts.
    fn truncated(&self) -> Decimal {
        if self.whole.len() > EXACT_PRECISION {
            return Decimal::MAX;
        }
        let keep = self.fraction.len().min(EXACT_PRECISION - self.whole.len());
        Self::decimal(self.whole, &self.fraction[..keep]).unwrap_or(Decimal::MAX)
    }

    fn decimal(whole: &str, fraction: &str) -> Option<Decimal> {
        let whole = if whole.is_empty() { "0" } else { whole };
        let text = if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        };
        Decimal::from_str_exact(&text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use wallet_shared::types::CurrencyCode;

    fn config() -> LedgerConfig {
        LedgerConfig::default()
    }

    #[rstest]
    #[case("10", dec!(10))]
    #[case("0.01", dec!(0.01))]
    #[case("10.50", dec!(10.50))]
    #[case("10.500", dec!(10.500))]
    #[case("999999999999999", dec!(999999999999999))]
    fn test_accepts_valid_amounts(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(validate_amount(raw, &config()).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ten")]
    #[case("1,5")]
    #[case("12.3.4")]
    #[case("1e3")]
    #[case("1E-2")]
    #[case("1_000")]
    #[case(" 10")]
    #[case("10 ")]
    #[case(".5")]
    #[case("5.")]
    #[case("--5")]
    #[case("+")]
    fn test_rejects_malformed(#[case] raw: &str) {
        assert_eq!(
            validate_amount(raw, &config()),
            Err(LedgerError::InvalidAmountFormat(raw.to_string()))
        );
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(
            validate_amount("-5", &config()),
            Err(LedgerError::NegativeAmount)
        );
    }

    #[rstest]
    #[case("0")]
    #[case("-0")]
    #[case("0.001")]
    #[case("0.009")]
    fn test_rejects_below_minimum(#[case] raw: &str) {
        assert_eq!(
            validate_amount(raw, &config()),
            Err(LedgerError::AmountBelowMinimum { minimum: dec!(0.01) })
        );
    }

    #[rstest]
    #[case("1.001")]
    #[case("1.00000000000000000000000000000001")]
    #[case("1.000000000000000000000000000001")]
    fn test_rejects_excess_fractional_digits(#[case] raw: &str) {
        assert_eq!(
            validate_amount(raw, &config()),
            Err(LedgerError::ExcessiveFractionalDigits { max: 2 })
        );
    }

    #[rstest]
    #[case("+10", dec!(10))]
    #[case("0010.50", dec!(10.5))]
    #[case("1.000000000000000000000000000000", dec!(1))]
    fn test_normalizes_accepted_text(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(validate_amount(raw, &config()).unwrap(), expected);
    }

    #[rstest]
    #[case("1000000000000000")]
    #[case("999999999999999.5")]
    #[case("100000000000000000000000000000")]
    #[case("100000000000000000000000000000.5")]
    fn test_rejects_excess_whole_digits(#[case] raw: &str) {
        let config = LedgerConfig::new(dec!(0.01), 15, 1, CurrencyCode::new("RUB")).unwrap();
        assert_eq!(
            validate_amount(raw, &config),
            Err(LedgerError::ExcessiveWholeDigits { max: 15 })
        );
    }

    #[test]
    fn test_negative_checked_before_minimum() {
        assert_eq!(
            validate_amount("-0.001", &config()),
            Err(LedgerError::NegativeAmount)
        );
    }

    #[test]
    fn test_minimum_checked_before_fractional_digits() {
        let config = LedgerConfig::new(dec!(1), 15, 2, CurrencyCode::new("RUB")).unwrap();
        assert_eq!(
            validate_amount("0.123", &config),
            Err(LedgerError::AmountBelowMinimum { minimum: dec!(1) })
        );
    }

    #[test]
    fn test_tiny_amount_beyond_precision_is_below_minimum() {
        assert_eq!(
            validate_amount("0.00999999999999999999999999999999", &config()),
            Err(LedgerError::AmountBelowMinimum { minimum: dec!(0.01) })
        );
    }

    #[test]
    fn test_digits_beyond_precision_are_never_rounded() {
        let config = LedgerConfig::new(dec!(0.01), 28, 28, CurrencyCode::new("RUB")).unwrap();
        assert_eq!(
            validate_amount("1234567890123456.1234567890123456", &config),
            Err(LedgerError::InvalidAmountFormat(
                "1234567890123456.1234567890123456".to_string()
            ))
        );
    }

    #[rstest]
    #[case("0.4", 1)]
    #[case("0.5", 1)]
    #[case("9.5", 2)]
    #[case("9.49", 1)]
    #[case("123.45", 3)]
    #[case("099.9", 3)]
    fn test_whole_digits_after_rounding(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(AmountText::parse(raw).unwrap().whole_digits(), expected);
    }

    #[rstest]
    #[case("1.2300", 2)]
    #[case("100", 0)]
    #[case("100.000", 0)]
    fn test_fractional_digits_ignore_trailing_zeros(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(AmountText::parse(raw).unwrap().fractional_digits(), expected);
    }
}
