//! Translation of database errors into ledger errors.
//!
//! Every repository funnels `DbErr` through [`classify`], so the caller
//! sees cancellation and timeouts as such rather than as opaque I/O
//! failures.

use sea_orm::{DbErr, RuntimeErr};
use sqlx::error::DatabaseError;
use wallet_core::{LedgerError, OperationContext};

/// Postgres `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

/// Unique constraint on `ledger_entries.idempotency_token`.
pub const IDEMPOTENCY_TOKEN_CONSTRAINT: &str = "uq_ledger_entries_idempotency_token";

fn database_error(err: &DbErr) -> Option<&dyn DatabaseError> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            Some(db_err.as_ref())
        }
        _ => None,
    }
}

/// Returns true if `err` violates the idempotency token constraint.
///
/// Violations of any other unique constraint are not token conflicts.
#[must_use]
pub fn is_token_conflict(err: &DbErr) -> bool {
    database_error(err).is_some_and(|db_err| {
        db_err.is_unique_violation() && db_err.constraint() == Some(IDEMPOTENCY_TOKEN_CONSTRAINT)
    })
}

/// Returns true if the server aborted the statement on a timeout.
#[must_use]
pub fn is_query_canceled(err: &DbErr) -> bool {
    database_error(err).is_some_and(|db_err| db_err.code().as_deref() == Some(QUERY_CANCELED))
}

/// Maps a database error to the error reported to the caller.
///
/// An interrupted context wins over whatever the driver reported, since
/// the driver error is then only a symptom.
#[must_use]
pub fn classify(err: &DbErr, ctx: &OperationContext) -> LedgerError {
    if let Some(reason) = ctx.interruption() {
        return reason;
    }
    if is_query_canceled(err) {
        return LedgerError::OperationTimedOut;
    }
    LedgerError::Database(err.to_string())
}
