//! Validated money movement rules.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use wallet_shared::config::LedgerSettings;
use wallet_shared::types::CurrencyCode;

/// Largest whole-digit count whose storable bound still fits a `Decimal`.
pub const MAX_SUPPORTED_WHOLE_DIGITS: u32 = 28;

/// Largest fractional-digit count a `Decimal` can carry.
pub const MAX_SUPPORTED_FRACTIONAL_DIGITS: u32 = 28;

/// Invalid ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerConfigError {
    /// Minimum monetary unit is not a decimal number.
    #[error("min_monetary_unit is not a decimal: {0:?}")]
    InvalidMinimumUnit(String),

    /// Minimum monetary unit is zero or negative.
    #[error("min_monetary_unit must be positive")]
    NonPositiveMinimumUnit,

    /// Whole-digit limit outside `1..=28`.
    #[error("max_whole_digits must be between 1 and {MAX_SUPPORTED_WHOLE_DIGITS}, got {0}")]
    WholeDigitsOutOfRange(u32),

    /// Fractional-digit limit above 28.
    #[error("max_fractional_digits must be at most {MAX_SUPPORTED_FRACTIONAL_DIGITS}, got {0}")]
    FractionalDigitsOutOfRange(u32),

    /// Native currency code is blank.
    #[error("native_currency must not be empty")]
    EmptyNativeCurrency,
}

/// Money movement rules shared by the validator and the ledger engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    min_monetary_unit: Decimal,
    max_whole_digits: u32,
    max_fractional_digits: u32,
    native_currency: CurrencyCode,
    storable_bound: Decimal,
    request_timeout: Option<Duration>,
}

impl LedgerConfig {
    /// Builds a configuration, checking every limit.
    pub fn new(
        min_monetary_unit: Decimal,
        max_whole_digits: u32,
        max_fractional_digits: u32,
        native_currency: CurrencyCode,
    ) -> Result<Self, LedgerConfigError> {
        if min_monetary_unit <= Decimal::ZERO {
            return Err(LedgerConfigError::NonPositiveMinimumUnit);
        }
        if max_whole_digits == 0 || max_whole_digits > MAX_SUPPORTED_WHOLE_DIGITS {
            return Err(LedgerConfigError::WholeDigitsOutOfRange(max_whole_digits));
        }
        if max_fractional_digits > MAX_SUPPORTED_FRACTIONAL_DIGITS {
            return Err(LedgerConfigError::FractionalDigitsOutOfRange(
                max_fractional_digits,
            ));
        }
        if native_currency.is_empty() {
            return Err(LedgerConfigError::EmptyNativeCurrency);
        }

        let storable_bound = (0..max_whole_digits)
            .try_fold(Decimal::ONE, |bound, _| bound.checked_mul(Decimal::TEN))
            .ok_or(LedgerConfigError::WholeDigitsOutOfRange(max_whole_digits))?;

        Ok(Self {
            min_monetary_unit,
            max_whole_digits,
            max_fractional_digits,
            native_currency,
            storable_bound,
            request_timeout: None,
        })
    }

    /// Sets the deadline applied to each operation.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Smallest amount an operation may move.
    #[must_use]
    pub const fn min_monetary_unit(&self) -> Decimal {
        self.min_monetary_unit
    }

    /// Maximum number of digits left of the decimal point.
    #[must_use]
    pub const fn max_whole_digits(&self) -> u32 {
        self.max_whole_digits
    }

    /// Maximum number of digits right of the decimal point.
    #[must_use]
    pub const fn max_fractional_digits(&self) -> u32 {
        self.max_fractional_digits
    }

    /// Currency balances are stored in.
    #[must_use]
    pub const fn native_currency(&self) -> &CurrencyCode {
        &self.native_currency
    }

    /// Deadline applied to each operation, if any.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Exclusive upper bound of a storable balance, `10^max_whole_digits`.
    #[must_use]
    pub const fn storable_bound(&self) -> Decimal {
        self.storable_bound
    }

    /// Returns the balance after adding `amount`, or `None` if it would
    /// reach the storable bound.
    #[must_use]
    pub fn checked_credit(&self, balance: Decimal, amount: Decimal) -> Option<Decimal> {
        balance
            .checked_add(amount)
            .filter(|new_balance| *new_balance < self.storable_bound)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_monetary_unit: Decimal::new(1, 2),
            max_whole_digits: 15,
            max_fractional_digits: 2,
            native_currency: CurrencyCode::new("RUB"),
            storable_bound: Decimal::from(1_000_000_000_000_000_i64),
            request_timeout: None,
        }
    }
}

impl TryFrom<&LedgerSettings> for LedgerConfig {
    type Error = LedgerConfigError;

    fn try_from(settings: &LedgerSettings) -> Result<Self, Self::Error> {
        let min_monetary_unit =
            Decimal::from_str(settings.min_monetary_unit.trim()).map_err(|_| {
                LedgerConfigError::InvalidMinimumUnit(settings.min_monetary_unit.clone())
            })?;

        let config = Self::new(
            min_monetary_unit,
            settings.max_whole_digits,
            settings.max_fractional_digits,
            CurrencyCode::new(&settings.native_currency),
        )?;

        Ok(if settings.request_timeout_secs > 0 {
            config.with_request_timeout(Duration::from_secs(settings.request_timeout_secs))
        } else {
            config
        })
    }
}
