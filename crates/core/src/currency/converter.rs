//! Currency converter contract.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use wallet_shared::types::CurrencyCode;

use crate::ledger::LedgerError;

/// Currency conversion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The provider has no rate for the requested currency.
    #[error("Currency not found: {0}")]
    CurrencyNotFound(String),

    /// The provider could not be reached or answered with garbage.
    #[error("Exchange rates unavailable: {0}")]
    Unavailable(String),
}

impl From<ConversionError> for LedgerError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::CurrencyNotFound(code) => Self::CurrencyNotFound(code),
            ConversionError::Unavailable(reason) => Self::ConversionUnavailable(reason),
        }
    }
}

/// Converts native-currency amounts into other currencies.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Converts `amount` from the native currency into `target`.
    ///
    /// A zero amount, or a target equal to the native currency, is
    /// returned unchanged.
    async fn convert(&self, amount: Decimal, target: &CurrencyCode)
    -> Result<Decimal, ConversionError>;
}
