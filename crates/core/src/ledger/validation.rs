//! Request validation for mutating operations.
//!
//! Turns raw requests into commands the ledger engine accepts. Nothing
//! here touches storage, so a rejected request never opens a transaction.

use super::amount::validate_amount;
use super::config::LedgerConfig;
use super::error::LedgerError;
use super::types::{
    Credit, CreditRequest, OperationKind, Transfer, TransferRequest, WithdrawRequest, Withdrawal,
};
use crate::idempotency::IdempotencyKey;

/// Validates a credit request.
pub fn validate_credit(
    request: &CreditRequest,
    config: &LedgerConfig,
) -> Result<Credit, LedgerError> {
    let amount = validate_amount(&request.amount, config)?;
    let key = IdempotencyKey::new(OperationKind::Credit, &request.idempotency_token)?;

    let display_name = request
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(Credit {
        account_id: request.account_id,
        display_name,
        amount,
        purpose: request.purpose.clone(),
        key,
    })
}

/// Validates a withdrawal request.
pub fn validate_withdraw(
    request: &WithdrawRequest,
    config: &LedgerConfig,
) -> Result<Withdrawal, LedgerError> {
    let amount = validate_amount(&request.amount, config)?;
    let key = IdempotencyKey::new(OperationKind::Withdraw, &request.idempotency_token)?;

    Ok(Withdrawal {
        account_id: request.account_id,
        amount,
        purpose: request.purpose.clone(),
        key,
    })
}

/// Validates a transfer request.
///
/// Equal sender and receiver ids are rejected before the amount is looked at.
pub fn validate_transfer(
    request: &TransferRequest,
    config: &LedgerConfig,
) -> Result<Transfer, LedgerError> {
    if request.sender_id == request.receiver_id {
        return Err(LedgerError::SameSenderAndReceiver);
    }

    let amount = validate_amount(&request.amount, config)?;
    let key = IdempotencyKey::new(OperationKind::Transfer, &request.idempotency_token)?;

    Ok(Transfer {
        sender_id: request.sender_id,
        receiver_id: request.receiver_id,
        amount,
        key,
    })
}
