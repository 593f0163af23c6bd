//! Wiring a [`BillingService`] from application configuration.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::info;
use wallet_core::LedgerConfig;
use wallet_core::idempotency::{IdempotencyGuard, MokaIdempotencyCache};
use wallet_core::ledger::LedgerConfigError;
use wallet_exchange::{ExchangeError, HttpCurrencyConverter};
use wallet_shared::AppConfig;

use crate::BillingService;

/// Failure assembling the service.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Ledger settings are invalid.
    #[error("invalid ledger settings: {0}")]
    Ledger(#[from] LedgerConfigError),

    /// The database could not be reached.
    #[error("database connection failed: {0}")]
    Database(#[from] DbErr),

    /// The exchange client could not be built.
    #[error("exchange client: {0}")]
    Exchange(#[from] ExchangeError),
}

/// Connects to the database and builds the service.
pub async fn build(config: &AppConfig) -> Result<BillingService, BuildError> {
    let db = wallet_db::connect(&config.database).await?;
    assemble(config, db)
}

/// Builds a service over `db` with the in-process idempotency cache and the
/// HTTP currency converter.
pub fn assemble(config: &AppConfig, db: DatabaseConnection) -> Result<BillingService, BuildError> {
    let ledger = LedgerConfig::try_from(&config.ledger)?;

    let cache = MokaIdempotencyCache::with_capacity(config.idempotency.max_capacity);
    let guard = IdempotencyGuard::new(
        Arc::new(cache),
        Duration::from_secs(config.idempotency.key_ttl_secs),
    );
    let converter =
        HttpCurrencyConverter::from_settings(&config.exchange, ledger.native_currency().clone())?;

    info!(
        native_currency = %ledger.native_currency(),
        exchange = %converter.endpoint(),
        "Billing service ready"
    );
    Ok(BillingService::with_config(db, ledger, guard, Arc::new(converter)))
}
