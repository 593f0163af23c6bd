//! Database migration runner for the wallet ledger.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show which migrations are applied
//!   migrator fresh   - Drop the wallet tables and migrate from scratch
//!
//! The connection string comes from `DATABASE_URL` (or `-u`).

use sea_orm_migration::prelude::*;
use wallet_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own tracing subscriber.
    cli::run_cli(Migrator).await;
}
