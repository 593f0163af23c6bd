//! Wallet billing facade.
//!
//! [`BillingService`] is the public entry point for the five wallet
//! operations. It validates requests, consults the idempotency fast path
//! and hands the work to the ledger engine and query readers in
//! `wallet-db`.

mod bootstrap;
mod service;

pub use bootstrap::{BuildError, assemble, build};
pub use service::BillingService;
