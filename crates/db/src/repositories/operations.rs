//! Operation history reads.

use chrono::Utc;
use sea_orm::sea_query::Order;
use sea_orm::{
    AccessMode, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::error;
use wallet_core::ledger::{
    OperationRecord, OperationsLog, OperationsQuery, OrderDirection, OrderField,
};
use wallet_core::{LedgerError, OperationContext};
use wallet_shared::types::{AccountId, PageResponse};

use crate::entities::{accounts, ledger_entries};
use crate::error::classify;
use crate::txn;

/// Column backing an ordering field.
const fn order_column(field: OrderField) -> ledger_entries::Column {
    match field {
        OrderField::Date => ledger_entries::Column::OccurredAt,
        OrderField::Amount => ledger_entries::Column::Amount,
    }
}

/// SQL direction of an ordering direction.
const fn order_direction(direction: OrderDirection) -> Order {
    match direction {
        OrderDirection::Asc => Order::Asc,
        OrderDirection::Desc => Order::Desc,
    }
}

impl From<ledger_entries::Model> for OperationRecord {
    fn from(model: ledger_entries::Model) -> Self {
        Self {
            id: model.id,
            account_id: AccountId(model.account_id),
            comment: model.comment,
            amount: model.amount,
            occurred_at: model.occurred_at.with_timezone(&Utc),
        }
    }
}

/// Repository for paginated operation history.
#[derive(Debug, Clone)]
pub struct OperationsRepository {
    db: DatabaseConnection,
}

impl OperationsRepository {
    /// Creates a new operations repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads one page of an account's history.
    ///
    /// Entries are sorted by the requested column with ties broken by
    /// entry id in the same direction, so pages never overlap.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn list(
        &self,
        ctx: &OperationContext,
        query: &OperationsQuery,
    ) -> Result<OperationsLog, LedgerError> {
        ctx.run(async {
            let on_db_error = |e: DbErr| {
                error!(error = %e, account_id = %query.account_id, "Failed to read operations");
                classify(&e, ctx)
            };

            let txn = txn::begin(&self.db, ctx, AccessMode::ReadOnly)
                .await
                .map_err(on_db_error)?;

            let account_id = query.account_id.into_inner();
            let exists = accounts::Entity::find_by_id(account_id)
                .count(&txn)
                .await
                .map_err(on_db_error)?
                > 0;
            if !exists {
                txn.commit().await.map_err(on_db_error)?;
                return Err(LedgerError::AccountNotFound(query.account_id));
            }

            let entries = ledger_entries::Entity::find()
                .filter(ledger_entries::Column::AccountId.eq(account_id));
            let total = entries.clone().count(&txn).await.map_err(on_db_error)?;

            let direction = order_direction(query.order_direction);
            let mut select = entries
                .order_by(order_column(query.order_field), direction.clone())
                .order_by(ledger_entries::Column::Id, direction);
            if let Some(limit) = query.page.limit() {
                select = select.limit(limit).offset(query.page.offset());
            }

            let rows = select.all(&txn).await.map_err(on_db_error)?;
            txn.commit().await.map_err(on_db_error)?;

            let records: Vec<OperationRecord> =
                rows.into_iter().map(OperationRecord::from).collect();
            Ok(PageResponse::new(records, query.page, total).into())
        })
        .await
    }
}
