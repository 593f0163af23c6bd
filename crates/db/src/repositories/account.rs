//! Account reads for balance queries.

use rust_decimal::Decimal;
use sea_orm::{AccessMode, DatabaseConnection, EntityTrait};
use tracing::error;
use wallet_core::{LedgerError, OperationContext};
use wallet_shared::types::AccountId;

use crate::entities::accounts;
use crate::error::classify;
use crate::txn;

/// Repository for point-in-time account reads.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads the stored balance of an account, without locking it.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn balance(
        &self,
        ctx: &OperationContext,
        account_id: AccountId,
    ) -> Result<Decimal, LedgerError> {
        ctx.run(async {
            let on_db_error = |e: sea_orm::DbErr| {
                error!(error = %e, account_id = %account_id, "Failed to read account balance");
                classify(&e, ctx)
            };

            let txn = txn::begin(&self.db, ctx, AccessMode::ReadOnly)
                .await
                .map_err(on_db_error)?;
            let account = accounts::Entity::find_by_id(account_id.into_inner())
                .one(&txn)
                .await
                .map_err(on_db_error)?;
            txn.commit().await.map_err(on_db_error)?;

            account
                .map(|account| account.balance)
                .ok_or(LedgerError::AccountNotFound(account_id))
        })
        .await
    }

    /// Returns the account row, if any. Used by tests and tooling.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find(
        &self,
        account_id: AccountId,
    ) -> Result<Option<accounts::Model>, sea_orm::DbErr> {
        accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await
    }
}
