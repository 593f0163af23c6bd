//! Transaction helpers shared by the repositories.

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel,
    TransactionTrait,
};
use tracing::error;
use wallet_core::OperationContext;

/// Begins a READ COMMITTED transaction bounded by the context deadline.
///
/// The remaining time becomes a transaction-local `statement_timeout`, so
/// a statement stuck on a row lock is aborted by the server once the
/// deadline passes.
pub(crate) async fn begin(
    db: &DatabaseConnection,
    ctx: &OperationContext,
    access: AccessMode,
) -> Result<DatabaseTransaction, DbErr> {
    let txn = db
        .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(access))
        .await?;

    if let Some(remaining) = ctx.remaining() {
        let millis = remaining.as_millis().max(1);
        txn.execute_unprepared(&format!("SET LOCAL statement_timeout = {millis}"))
            .await?;
    }

    Ok(txn)
}

/// Rolls back `txn`, logging instead of failing if that is impossible.
pub(crate) async fn rollback(txn: DatabaseTransaction, operation: &'static str) {
    if let Err(e) = txn.rollback().await {
        error!(error = %e, operation, "Failed to roll back transaction");
    }
}
