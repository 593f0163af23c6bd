//! Currency conversion for balance queries.
//!
//! Balances are stored in the native currency only. Converted figures are
//! computed on read and never written back.

pub mod conversion;
pub mod converter;
pub mod rates;

pub use conversion::{DISPLAY_DECIMAL_PLACES, convert_amount};
pub use converter::{ConversionError, CurrencyConverter};
pub use rates::ExchangeRates;
