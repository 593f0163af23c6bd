//! Wallet ledger rules.
//!
//! This module implements the pure side of money movement:
//! - Amount validation against the configured limits
//! - Raw requests and validated commands
//! - Operation outcomes and entry comments
//! - The error taxonomy shared by every layer

pub mod amount;
pub mod config;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod amount_props;

pub use amount::validate_amount;
pub use config::{LedgerConfig, LedgerConfigError};
pub use error::{ErrorCategory, LedgerError};
pub use types::{
    BalanceRequest, Credit, CreditRequest, OperationKind, OperationOutcome, OperationRecord,
    OperationsLog, OperationsQuery, OperationsRequest, OrderDirection, OrderField, Transfer,
    TransferRequest, UserBalance, WithdrawRequest, Withdrawal, credit_comment, transfer_in_comment,
    transfer_out_comment, withdraw_comment,
};
pub use validation::{validate_credit, validate_transfer, validate_withdraw};
