//! Core business logic for the wallet ledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and collaborator contracts live here.
//!
//! # Modules
//!
//! - `ledger` - Amount validation, operation types and the error taxonomy
//! - `idempotency` - Token keys and the fast-path token cache
//! - `currency` - Exchange rates and the currency converter contract
//! - `context` - Per-operation deadline and cancellation

pub mod context;
pub mod currency;
pub mod idempotency;
pub mod ledger;

pub use context::OperationContext;
pub use ledger::{LedgerConfig, LedgerError};
