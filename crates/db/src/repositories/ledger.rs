//! Ledger transaction engine.
//!
//! Each mutating operation is one READ COMMITTED transaction:
//! lock the account row(s), look the token up, check the business rules,
//! update balances, append the ledger entries, commit. Any other exit rolls
//! the transaction back.
//!
//! Transfers lock both rows with a single `ORDER BY id` query, so two
//! transfers between the same accounts always lock them in the same order
//! whichever direction they move money.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use tracing::{error, info, warn};
use wallet_core::idempotency::IdempotencyKey;
use wallet_core::ledger::{
    Credit, OperationKind, OperationOutcome, Transfer, Withdrawal, credit_comment,
    transfer_in_comment, transfer_out_comment, withdraw_comment,
};
use wallet_core::{LedgerConfig, LedgerError, OperationContext};
use wallet_shared::types::AccountId;

use crate::entities::{accounts, ledger_entries};
use crate::error::{classify, is_token_conflict};
use crate::txn;

/// Failure inside an open ledger transaction.
#[derive(Debug, thiserror::Error)]
enum TxnError {
    /// A business rule rejected the operation.
    #[error(transparent)]
    Rule(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// What an open transaction should do next.
enum Step {
    /// Changes are staged; commit them.
    Commit,
    /// The token was found already consumed; roll back.
    AlreadyUsed,
}

/// Repository executing credits, withdrawals and transfers.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Credits an account, creating it on first credit.
    ///
    /// # Errors
    ///
    /// Returns `AmountExceedsStorableMaximum` if the new balance would not
    /// fit, or an infrastructure / interruption error.
    pub async fn credit(
        &self,
        ctx: &OperationContext,
        credit: &Credit,
    ) -> Result<OperationOutcome, LedgerError> {
        ctx.run(async {
            let txn = self.begin(ctx, OperationKind::Credit).await?;
            let result = self.apply_credit(&txn, credit, now()).await;
            self.settle(ctx, &credit.key, txn, result).await
        })
        .await
    }

    /// Debits an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `InsufficientFunds`, or an
    /// infrastructure / interruption error.
    pub async fn withdraw(
        &self,
        ctx: &OperationContext,
        withdrawal: &Withdrawal,
    ) -> Result<OperationOutcome, LedgerError> {
        ctx.run(async {
            let txn = self.begin(ctx, OperationKind::Withdraw).await?;
            let result = self.apply_withdraw(&txn, withdrawal, now()).await;
            self.settle(ctx, &withdrawal.key, txn, result).await
        })
        .await
    }

    /// Moves money between two existing accounts.
    ///
    /// # Errors
    ///
    /// Returns `SenderNotFound`, `ReceiverNotFound`,
    /// `SenderAndReceiverNotFound`, `InsufficientFunds` or
    /// `AmountExceedsStorableMaximum`, or an infrastructure / interruption
    /// error.
    pub async fn transfer(
        &self,
        ctx: &OperationContext,
        transfer: &Transfer,
    ) -> Result<OperationOutcome, LedgerError> {
        ctx.run(async {
            let txn = self.begin(ctx, OperationKind::Transfer).await?;
            let result = self.apply_transfer(&txn, transfer, now()).await;
            self.settle(ctx, &transfer.key, txn, result).await
        })
        .await
    }

    async fn begin(
        &self,
        ctx: &OperationContext,
        kind: OperationKind,
    ) -> Result<DatabaseTransaction, LedgerError> {
        txn::begin(&self.db, ctx, AccessMode::ReadWrite)
            .await
            .map_err(|e| {
                error!(error = %e, operation = %kind, "Failed to begin ledger transaction");
                classify(&e, ctx)
            })
    }

    /// Commits or rolls back `txn` according to `result`.
    ///
    /// A violation of the token constraint means a concurrent execution
    /// with the same token won the race; it is reported as `AlreadyUsed`.
    async fn settle(
        &self,
        ctx: &OperationContext,
        key: &IdempotencyKey,
        txn: DatabaseTransaction,
        result: Result<Step, TxnError>,
    ) -> Result<OperationOutcome, LedgerError> {
        let operation = key.kind().as_str();

        match result {
            Ok(Step::Commit) => {
                txn.commit().await.map_err(|e| {
                    error!(error = %e, key = %key, "Failed to commit ledger transaction");
                    classify(&e, ctx)
                })?;
                Ok(OperationOutcome::Done(key.kind()))
            }
            Ok(Step::AlreadyUsed) => {
                txn::rollback(txn, operation).await;
                warn!(key = %key, "Idempotency token already used");
                Ok(OperationOutcome::AlreadyUsed)
            }
            Err(TxnError::Database(e)) if is_token_conflict(&e) => {
                txn::rollback(txn, operation).await;
                warn!(key = %key, "Idempotency token consumed concurrently");
                Ok(OperationOutcome::AlreadyUsed)
            }
            Err(TxnError::Database(e)) => {
                txn::rollback(txn, operation).await;
                error!(error = %e, key = %key, "Ledger transaction failed");
                Err(classify(&e, ctx))
            }
            Err(TxnError::Rule(e)) => {
                txn::rollback(txn, operation).await;
                info!(error = %e, key = %key, "Ledger operation rejected");
                Err(e)
            }
        }
    }

    async fn apply_credit(
        &self,
        txn: &DatabaseTransaction,
        credit: &Credit,
        now: DateTime<FixedOffset>,
    ) -> Result<Step, TxnError> {
        let account_id = credit.account_id;

        // Concurrent first credits of one id converge on a single row.
        txn.execute_unprepared("LOCK TABLE accounts IN ROW SHARE MODE")
            .await?;
        accounts::Entity::insert(accounts::ActiveModel {
            id: Set(account_id.into_inner()),
            display_name: Set(credit.display_name.clone()),
            balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .on_conflict(
            OnConflict::column(accounts::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;

        let account = accounts::Entity::find_by_id(account_id.into_inner())
            .lock(LockType::Update)
            .one(txn)
            .await?
            .ok_or_else(|| {
                LedgerError::Internal(format!("account {account_id} missing after insert"))
            })?;

        let token = credit.key.entry_token();
        if token_used(txn, &token).await? {
            return Ok(Step::AlreadyUsed);
        }

        let new_balance = self
            .config
            .checked_credit(account.balance, credit.amount)
            .ok_or(LedgerError::AmountExceedsStorableMaximum)?;

        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(new_balance);
        if let Some(name) = &credit.display_name {
            active.display_name = Set(Some(name.clone()));
        }
        active.updated_at = Set(now);
        active.update(txn).await?;

        append_entries(
            txn,
            vec![entry(
                account_id,
                credit_comment(&credit.purpose),
                credit.amount,
                now,
                token,
            )],
        )
        .await?;

        info!(account_id = %account_id, amount = %credit.amount, "Account credited");
        Ok(Step::Commit)
    }

    async fn apply_withdraw(
        &self,
        txn: &DatabaseTransaction,
        withdrawal: &Withdrawal,
        now: DateTime<FixedOffset>,
    ) -> Result<Step, TxnError> {
        let account_id = withdrawal.account_id;

        let account = accounts::Entity::find_by_id(account_id.into_inner())
            .lock(LockType::NoKeyUpdate)
            .one(txn)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let token = withdrawal.key.entry_token();
        if token_used(txn, &token).await? {
            return Ok(Step::AlreadyUsed);
        }

        if account.balance < withdrawal.amount {
            return Err(LedgerError::InsufficientFunds(account_id).into());
        }
        let new_balance = account.balance - withdrawal.amount;

        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(new_balance);
        active.updated_at = Set(now);
        active.update(txn).await?;

        append_entries(
            txn,
            vec![entry(
                account_id,
                withdraw_comment(&withdrawal.purpose),
                -withdrawal.amount,
                now,
                token,
            )],
        )
        .await?;

        info!(account_id = %account_id, amount = %withdrawal.amount, "Account debited");
        Ok(Step::Commit)
    }

    async fn apply_transfer(
        &self,
        txn: &DatabaseTransaction,
        transfer: &Transfer,
        now: DateTime<FixedOffset>,
    ) -> Result<Step, TxnError> {
        let sender_id = transfer.sender_id;
        let receiver_id = transfer.receiver_id;

        let locked = accounts::Entity::find()
            .filter(
                accounts::Column::Id.is_in(transfer.lock_order().map(AccountId::into_inner)),
            )
            .order_by_asc(accounts::Column::Id)
            .lock(LockType::NoKeyUpdate)
            .all(txn)
            .await?;

        let find = |id: AccountId| locked.iter().find(|a| a.id == id.into_inner()).cloned();
        let (sender, receiver) = match (find(sender_id), find(receiver_id)) {
            (Some(sender), Some(receiver)) => (sender, receiver),
            (None, None) => return Err(LedgerError::SenderAndReceiverNotFound.into()),
            (None, Some(_)) => return Err(LedgerError::SenderNotFound(sender_id).into()),
            (Some(_), None) => return Err(LedgerError::ReceiverNotFound(receiver_id).into()),
        };

        let (out_token, in_token) = transfer.key.transfer_tokens();
        if token_used(txn, &out_token).await? {
            return Ok(Step::AlreadyUsed);
        }

        if sender.balance < transfer.amount {
            return Err(LedgerError::InsufficientFunds(sender_id).into());
        }
        let receiver_balance = self
            .config
            .checked_credit(receiver.balance, transfer.amount)
            .ok_or(LedgerError::AmountExceedsStorableMaximum)?;
        let sender_balance = sender.balance - transfer.amount;

        let out_comment = transfer_out_comment(&receiver.comment_name());
        let in_comment = transfer_in_comment(&sender.comment_name());

        let mut sender_active: accounts::ActiveModel = sender.into();
        sender_active.balance = Set(sender_balance);
        sender_active.updated_at = Set(now);
        sender_active.update(txn).await?;

        let mut receiver_active: accounts::ActiveModel = receiver.into();
        receiver_active.balance = Set(receiver_balance);
        receiver_active.updated_at = Set(now);
        receiver_active.update(txn).await?;

        append_entries(
            txn,
            vec![
                entry(sender_id, out_comment, -transfer.amount, now, out_token),
                entry(receiver_id, in_comment, transfer.amount, now, in_token),
            ],
        )
        .await?;

        info!(
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            amount = %transfer.amount,
            "Money transferred"
        );
        Ok(Step::Commit)
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

/// Returns true if an entry already carries `token`.
async fn token_used(txn: &DatabaseTransaction, token: &str) -> Result<bool, DbErr> {
    let count = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::IdempotencyToken.eq(token))
        .count(txn)
        .await?;
    Ok(count > 0)
}

fn entry(
    account_id: AccountId,
    comment: String,
    amount: Decimal,
    occurred_at: DateTime<FixedOffset>,
    idempotency_token: String,
) -> ledger_entries::ActiveModel {
    ledger_entries::ActiveModel {
        account_id: Set(account_id.into_inner()),
        comment: Set(comment),
        amount: Set(amount),
        occurred_at: Set(occurred_at),
        idempotency_token: Set(idempotency_token),
        ..Default::default()
    }
}

/// Inserts all entries of one operation in a single statement.
async fn append_entries(
    txn: &DatabaseTransaction,
    entries: Vec<ledger_entries::ActiveModel>,
) -> Result<(), DbErr> {
    ledger_entries::Entity::insert_many(entries)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}
