//! Seeds demo wallets for local development.
//!
//! Every operation carries a fixed idempotency token, so running the seeder
//! again leaves the balances untouched.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet_billing::BillingService;
use wallet_core::OperationContext;
use wallet_core::ledger::{BalanceRequest, CreditRequest, TransferRequest};
use wallet_db::migration::Migrator;
use wallet_shared::AppConfig;
use wallet_shared::types::AccountId;

/// Demo accounts: id, display name, opening credit.
const DEMO_ACCOUNTS: &[(i64, &str, &str)] = &[
    (1, "Alice", "1000.00"),
    (2, "Bob", "250.00"),
    (3, "Carol", "75.50"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = wallet_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None).await.context("failed to run migrations")?;

    let billing = wallet_billing::assemble(&config, db)?;
    let ctx = OperationContext::new();

    for &(id, name, amount) in DEMO_ACCOUNTS {
        let request = CreditRequest {
            account_id: AccountId(id),
            display_name: Some(name.to_string()),
            amount: amount.to_string(),
            purpose: "opening balance".to_string(),
            idempotency_token: format!("seed-opening-{id}"),
        };
        let outcome = billing.credit_user_account(&ctx, &request).await?;
        info!(account_id = id, name, outcome = outcome.message(), "Seeded account");
    }

    let transfer = TransferRequest {
        sender_id: AccountId(1),
        receiver_id: AccountId(2),
        amount: "100".to_string(),
        idempotency_token: "seed-transfer-1-2".to_string(),
    };
    let outcome = billing.transfer_money_from_user_to_user(&ctx, &transfer).await?;
    info!(outcome = outcome.message(), "Seeded transfer");

    report(&billing, &ctx).await
}

async fn report(billing: &BillingService, ctx: &OperationContext) -> anyhow::Result<()> {
    for &(id, name, _) in DEMO_ACCOUNTS {
        let request = BalanceRequest {
            account_id: AccountId(id),
            currency: None,
        };
        let balance = billing.get_user_balance(ctx, &request).await?;
        println!("  {name:<8} #{id}: {} {}", balance.balance, balance.currency);
    }
    Ok(())
}
