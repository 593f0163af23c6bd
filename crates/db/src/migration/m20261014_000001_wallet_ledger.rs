//! Wallet ledger schema.
//!
//! Creates the accounts table and the append-only ledger entries table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(WALLET_LEDGER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS ledger_entries CASCADE; DROP TABLE IF EXISTS accounts CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const WALLET_LEDGER_SQL: &str = r"
-- Accounts: ids are assigned by the caller, balances never go negative
CREATE TABLE accounts (
    id BIGINT PRIMARY KEY,
    display_name TEXT,
    balance NUMERIC NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_accounts_balance_non_negative CHECK (balance >= 0)
);

-- Ledger entries: append-only, one row per balance change
CREATE TABLE ledger_entries (
    id BIGSERIAL PRIMARY KEY,
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    comment TEXT NOT NULL,
    amount NUMERIC NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    idempotency_token TEXT NOT NULL,
    CONSTRAINT chk_ledger_entries_amount_non_zero CHECK (amount <> 0),
    CONSTRAINT uq_ledger_entries_idempotency_token UNIQUE (idempotency_token)
);

-- History sorted by date
CREATE INDEX idx_ledger_entries_account_date ON ledger_entries(account_id, occurred_at, id);

-- History sorted by amount
CREATE INDEX idx_ledger_entries_account_amount ON ledger_entries(account_id, amount, id);
";
