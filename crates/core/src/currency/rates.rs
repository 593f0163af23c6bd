//! Exchange rate snapshots.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wallet_shared::types::CurrencyCode;

use super::conversion::convert_amount;
use super::converter::{ConversionError, CurrencyConverter};

/// Rates for one base currency, as published by the exchange provider.
///
/// `rates[code]` is how many units of `code` one unit of `base` buys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRates {
    /// Currency the rates are quoted against.
    pub base: CurrencyCode,
    /// Publication date as reported by the provider.
    #[serde(default)]
    pub date: Option<String>,
    /// Rate per target currency.
    pub rates: HashMap<CurrencyCode, Decimal>,
}

impl ExchangeRates {
    /// Creates a snapshot without a publication date.
    #[must_use]
    pub fn new(
        base: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
    ) -> Self {
        Self {
            base,
            date: None,
            rates: rates.into_iter().collect(),
        }
    }

    /// Rate for `target`, if published.
    #[must_use]
    pub fn rate(&self, target: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(target).copied()
    }

    /// Converts a base-currency `amount` into `target`.
    pub fn convert(
        &self,
        amount: Decimal,
        target: &CurrencyCode,
    ) -> Result<Decimal, ConversionError> {
        if *target == self.base {
            return Ok(amount);
        }

        let rate = self
            .rate(target)
            .ok_or_else(|| ConversionError::CurrencyNotFound(target.to_string()))?;

        if amount.is_zero() {
            return Ok(amount);
        }

        convert_amount(amount, rate).ok_or_else(|| {
            ConversionError::Unavailable(format!("conversion of {amount} to {target} overflows"))
        })
    }
}

/// A snapshot converts with fixed rates, which is enough for tests and
/// for deployments without network access to the provider.
#[async_trait]
impl CurrencyConverter for ExchangeRates {
    async fn convert(
        &self,
        amount: Decimal,
        target: &CurrencyCode,
    ) -> Result<Decimal, ConversionError> {
        Self::convert(self, amount, target)
    }
}
