//! Ledger domain types.
//!
//! Raw requests carry the amount as a string exactly as the caller sent
//! it. Validated commands carry a checked `Decimal` and the idempotency
//! key, and are the only thing the ledger engine accepts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wallet_shared::types::{AccountId, CurrencyCode, PageRequest, PageResponse};

use super::error::LedgerError;
use crate::idempotency::IdempotencyKey;

/// Kind of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// External money coming into an account.
    Credit,
    /// Money leaving an account to an external service.
    Withdraw,
    /// Money moving between two accounts.
    Transfer,
}

impl OperationKind {
    /// Returns the lowercase name used in token keys and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Withdraw => "withdraw",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful result of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The operation was applied.
    Done(OperationKind),
    /// The token was already consumed; nothing was changed.
    AlreadyUsed,
}

impl OperationOutcome {
    /// Human-readable status message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Done(OperationKind::Credit) => "Account crediting Done",
            Self::Done(OperationKind::Withdraw) => "Account withdraw Done",
            Self::Done(OperationKind::Transfer) => "Money transfer Done",
            Self::AlreadyUsed => "Operation with specified token had already been done",
        }
    }

    /// Returns true if the token had already been consumed.
    #[must_use]
    pub const fn is_already_used(self) -> bool {
        matches!(self, Self::AlreadyUsed)
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ============================================================================
// Raw requests
// ============================================================================

/// Request to credit an account from an external service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRequest {
    /// Account to credit; created on first credit.
    pub account_id: AccountId,
    /// Display name to store on the account, last write wins.
    pub display_name: Option<String>,
    /// Amount as a decimal string.
    pub amount: String,
    /// Free-form purpose copied into the entry comment.
    pub purpose: String,
    /// Caller-chosen idempotency token.
    pub idempotency_token: String,
}

/// Request to debit an account to an external service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// Account to debit.
    pub account_id: AccountId,
    /// Amount as a decimal string.
    pub amount: String,
    /// Free-form purpose copied into the entry comment.
    pub purpose: String,
    /// Caller-chosen idempotency token.
    pub idempotency_token: String,
}

/// Request to move money between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Account to debit.
    pub sender_id: AccountId,
    /// Account to credit.
    pub receiver_id: AccountId,
    /// Amount as a decimal string.
    pub amount: String,
    /// Caller-chosen idempotency token.
    pub idempotency_token: String,
}

/// Request for an account balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// Account to read.
    pub account_id: AccountId,
    /// Target currency; empty or `None` means the native currency.
    pub currency: Option<String>,
}

/// Request for a page of the operation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationsRequest {
    /// Account whose history is read.
    pub account_id: AccountId,
    /// Page number, `0` and `1` both mean the first page.
    pub page: i64,
    /// Page size, `-1` means the whole history.
    pub limit: i64,
    /// `"date"` or `"amount"`, case-insensitive; empty means date.
    pub order_field: String,
    /// `"asc"` or `"desc"`, case-insensitive; empty means desc.
    pub order_direction: String,
}

// ============================================================================
// Validated commands
// ============================================================================

/// Validated credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    /// Account to credit.
    pub account_id: AccountId,
    /// Display name to store, if given.
    pub display_name: Option<String>,
    /// Checked amount.
    pub amount: Decimal,
    /// Purpose for the entry comment.
    pub purpose: String,
    /// Idempotency key of the operation.
    pub key: IdempotencyKey,
}

/// Validated withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Account to debit.
    pub account_id: AccountId,
    /// Checked amount.
    pub amount: Decimal,
    /// Purpose for the entry comment.
    pub purpose: String,
    /// Idempotency key of the operation.
    pub key: IdempotencyKey,
}

/// Validated transfer between two distinct accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Account to debit.
    pub sender_id: AccountId,
    /// Account to credit.
    pub receiver_id: AccountId,
    /// Checked amount.
    pub amount: Decimal,
    /// Idempotency key of the operation.
    pub key: IdempotencyKey,
}

impl Transfer {
    /// Both account ids in ascending order, the order rows are locked in.
    #[must_use]
    pub fn lock_order(&self) -> [AccountId; 2] {
        let (low, high) = if self.sender_id <= self.receiver_id {
            (self.sender_id, self.receiver_id)
        } else {
            (self.receiver_id, self.sender_id)
        };
        [low, high]
    }
}

// ============================================================================
// History ordering
// ============================================================================

/// Column the operation history is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    /// Entry timestamp.
    #[default]
    Date,
    /// Signed entry amount.
    Amount,
}

impl FromStr for OrderField {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            _ => Err(LedgerError::BadOrderField(s.to_string())),
        }
    }
}

/// Sort direction of the operation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Oldest or smallest first.
    Asc,
    /// Newest or largest first.
    #[default]
    Desc,
}

impl FromStr for OrderDirection {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "" | "desc" => Ok(Self::Desc),
            _ => Err(LedgerError::BadOrderDirection(s.to_string())),
        }
    }
}

/// Validated history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationsQuery {
    /// Account whose history is read.
    pub account_id: AccountId,
    /// Page window.
    pub page: PageRequest,
    /// Sort column.
    pub order_field: OrderField,
    /// Sort direction.
    pub order_direction: OrderDirection,
}

impl TryFrom<&OperationsRequest> for OperationsQuery {
    type Error = LedgerError;

    fn try_from(request: &OperationsRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            account_id: request.account_id,
            page: PageRequest::new(request.page, request.limit)?,
            order_field: request.order_field.parse()?,
            order_direction: request.order_direction.parse()?,
        })
    }
}

// ============================================================================
// Read models
// ============================================================================

/// One row of an account's operation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Entry id, increasing in insertion order.
    pub id: i64,
    /// Account the entry belongs to.
    pub account_id: AccountId,
    /// Human-readable description.
    pub comment: String,
    /// Signed amount, negative for debits.
    pub amount: Decimal,
    /// When the entry was written.
    pub occurred_at: DateTime<Utc>,
}

/// A page of an account's operation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationsLog {
    /// Entries of the requested page.
    pub operations: Vec<OperationRecord>,
    /// Number of entries across all pages.
    pub operations_total: u64,
    /// Page returned.
    pub page: i64,
    /// Number of pages for the requested limit.
    pub pages_total: u64,
}

impl From<PageResponse<OperationRecord>> for OperationsLog {
    fn from(page: PageResponse<OperationRecord>) -> Self {
        Self {
            operations: page.items,
            operations_total: page.total,
            page: page.page,
            pages_total: page.pages_total,
        }
    }
}

/// Balance of an account, in the native or a requested currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalance {
    /// Balance amount.
    pub balance: Decimal,
    /// Currency of `balance`.
    pub currency: CurrencyCode,
}

// ============================================================================
// Entry comments
// ============================================================================

/// Comment of an entry written by a credit.
#[must_use]
pub fn credit_comment(purpose: &str) -> String {
    format!("payment from service, {purpose}")
}

/// Comment of an entry written by a withdrawal.
#[must_use]
pub fn withdraw_comment(purpose: &str) -> String {
    format!("payment to service, {purpose}")
}

/// Comment of the sender's entry of a transfer.
#[must_use]
pub fn transfer_out_comment(receiver_name: &str) -> String {
    format!("transfer to user {receiver_name}")
}

/// Comment of the receiver's entry of a transfer.
#[must_use]
pub fn transfer_in_comment(sender_name: &str) -> String {
    format!("transfer from user {sender_name}")
}
