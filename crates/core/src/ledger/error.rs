//! Ledger error types.
//!
//! Every failure an operation can report is a variant of [`LedgerError`].
//! The variants fall into four categories (validation, business rule,
//! infrastructure, interruption) so transports can map them without
//! matching on every case.

use rust_decimal::Decimal;
use thiserror::Error;
use wallet_shared::types::{AccountId, PageError};

/// Broad class of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself is malformed.
    Validation,
    /// The request is well-formed but the ledger state forbids it.
    BusinessRule,
    /// A collaborator (database, cache, exchange provider) failed.
    Infrastructure,
    /// The caller cancelled the operation or its deadline expired.
    Interrupted,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount string is not a decimal number.
    #[error("Invalid amount format: {0:?}")]
    InvalidAmountFormat(String),

    /// Amount is negative.
    #[error("Amount must not be negative")]
    NegativeAmount,

    /// Amount is smaller than the minimum operable unit.
    #[error("Amount must be at least {minimum}")]
    AmountBelowMinimum {
        /// Configured minimum operable unit.
        minimum: Decimal,
    },

    /// Amount has more digits after the decimal point than allowed.
    #[error("Amount must have at most {max} fractional digits")]
    ExcessiveFractionalDigits {
        /// Configured maximum fractional-digit count.
        max: u32,
    },

    /// Amount has more digits before the decimal point than allowed.
    #[error("Amount must have at most {max} whole digits")]
    ExcessiveWholeDigits {
        /// Configured maximum whole-digit count.
        max: u32,
    },

    /// Idempotency token is empty.
    #[error("Idempotency token must not be empty")]
    MissingIdempotencyToken,

    /// Transfer sender and receiver are the same account.
    #[error("Sender and receiver must be different accounts")]
    SameSenderAndReceiver,

    /// Page number is negative.
    #[error("Bad page: {0}")]
    BadPage(i64),

    /// Page size is below the unbounded marker.
    #[error("Bad limit: {0}")]
    BadLimit(i64),

    /// Unknown ordering field.
    #[error("Bad order field: {0:?}")]
    BadOrderField(String),

    /// Unknown ordering direction.
    #[error("Bad order direction: {0:?}")]
    BadOrderDirection(String),

    /// Requested currency is not known to the exchange provider.
    #[error("Currency not found: {0}")]
    CurrencyNotFound(String),

    // ========== Business Rule Errors ==========
    /// Account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Transfer sender does not exist.
    #[error("Sender not found: {0}")]
    SenderNotFound(AccountId),

    /// Transfer receiver does not exist.
    #[error("Receiver not found: {0}")]
    ReceiverNotFound(AccountId),

    /// Neither transfer party exists.
    #[error("Sender and receiver not found")]
    SenderAndReceiverNotFound,

    /// Balance is lower than the amount to debit.
    #[error("Insufficient funds on account {0}")]
    InsufficientFunds(AccountId),

    /// The resulting balance would not fit the configured whole-digit limit.
    #[error("Resulting balance exceeds the storable maximum")]
    AmountExceedsStorableMaximum,

    // ========== Infrastructure Errors ==========
    /// Exchange provider could not be reached or returned garbage.
    #[error("Currency conversion unavailable: {0}")]
    ConversionUnavailable(String),

    /// Idempotency token lookup failed inside the transaction.
    #[error("Idempotency check failed: {0}")]
    IdempotencyCheckFailed(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),

    // ========== Interruption ==========
    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    OperationCancelled,

    /// The operation deadline expired.
    #[error("Operation timed out")]
    OperationTimedOut,
}

impl LedgerError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAmountFormat(_)
            | Self::NegativeAmount
            | Self::AmountBelowMinimum { .. }
            | Self::ExcessiveFractionalDigits { .. }
            | Self::ExcessiveWholeDigits { .. }
            | Self::MissingIdempotencyToken
            | Self::SameSenderAndReceiver
            | Self::BadPage(_)
            | Self::BadLimit(_)
            | Self::BadOrderField(_)
            | Self::BadOrderDirection(_)
            | Self::CurrencyNotFound(_) => ErrorCategory::Validation,

            Self::AccountNotFound(_)
            | Self::SenderNotFound(_)
            | Self::ReceiverNotFound(_)
            | Self::SenderAndReceiverNotFound
            | Self::InsufficientFunds(_)
            | Self::AmountExceedsStorableMaximum => ErrorCategory::BusinessRule,

            Self::ConversionUnavailable(_)
            | Self::IdempotencyCheckFailed(_)
            | Self::Database(_)
            | Self::Internal(_) => ErrorCategory::Infrastructure,

            Self::OperationCancelled | Self::OperationTimedOut => ErrorCategory::Interrupted,
        }
    }

    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmountFormat(_) => "INVALID_AMOUNT_FORMAT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AmountBelowMinimum { .. } => "AMOUNT_BELOW_MINIMUM",
            Self::ExcessiveFractionalDigits { .. } => "EXCESSIVE_FRACTIONAL_DIGITS",
            Self::ExcessiveWholeDigits { .. } => "EXCESSIVE_WHOLE_DIGITS",
            Self::MissingIdempotencyToken => "MISSING_IDEMPOTENCY_TOKEN",
            Self::SameSenderAndReceiver => "SAME_SENDER_AND_RECEIVER",
            Self::BadPage(_) => "BAD_PAGE",
            Self::BadLimit(_) => "BAD_LIMIT",
            Self::BadOrderField(_) => "BAD_ORDER_FIELD",
            Self::BadOrderDirection(_) => "BAD_ORDER_DIRECTION",
            Self::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::SenderNotFound(_) => "SENDER_NOT_FOUND",
            Self::ReceiverNotFound(_) => "RECEIVER_NOT_FOUND",
            Self::SenderAndReceiverNotFound => "SENDER_AND_RECEIVER_NOT_FOUND",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::AmountExceedsStorableMaximum => "AMOUNT_EXCEEDS_STORABLE_MAXIMUM",
            Self::ConversionUnavailable(_) => "CONVERSION_UNAVAILABLE",
            Self::IdempotencyCheckFailed(_) => "IDEMPOTENCY_CHECK_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::OperationCancelled => "OPERATION_CANCELLED",
            Self::OperationTimedOut => "OPERATION_TIMED_OUT",
        }
    }

    /// Suggested HTTP status for transports that expose the ledger over HTTP.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_)
            | Self::SenderNotFound(_)
            | Self::ReceiverNotFound(_)
            | Self::SenderAndReceiverNotFound => 404,
            Self::InsufficientFunds(_) | Self::AmountExceedsStorableMaximum => 422,
            Self::ConversionUnavailable(_) => 502,
            Self::IdempotencyCheckFailed(_) | Self::Database(_) | Self::Internal(_) => 500,
            // Non-standard, widely used for "client closed request".
            Self::OperationCancelled => 499,
            Self::OperationTimedOut => 504,
            _ => 400,
        }
    }

    /// Returns true if repeating the same request may succeed.
    ///
    /// Retrying is safe for writes because a repeated token is reported as
    /// already used rather than applied twice.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OperationTimedOut
                | Self::ConversionUnavailable(_)
                | Self::IdempotencyCheckFailed(_)
                | Self::Database(_)
        )
    }

    /// Returns true for cancellation or deadline expiry.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self.category(), ErrorCategory::Interrupted)
    }
}

impl From<PageError> for LedgerError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::BadPage(page) => Self::BadPage(page),
            PageError::BadLimit(limit) => Self::BadLimit(limit),
        }
    }
}
