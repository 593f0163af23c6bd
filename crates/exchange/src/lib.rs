//! Exchange-rate provider client.
//!
//! Fetches the latest rates for the native currency from a remote HTTP
//! service and converts balances with them. A fetched snapshot is reused
//! until its TTL runs out.

mod client;
mod error;

pub use client::HttpCurrencyConverter;
pub use error::ExchangeError;
