//! The billing facade.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};
use wallet_core::currency::CurrencyConverter;
use wallet_core::idempotency::{IdempotencyGuard, IdempotencyKey};
use wallet_core::ledger::{
    BalanceRequest, CreditRequest, LedgerConfigError, OperationOutcome, OperationsLog,
    OperationsQuery, OperationsRequest, TransferRequest, UserBalance, WithdrawRequest,
    validate_credit, validate_transfer, validate_withdraw,
};
use wallet_core::{LedgerConfig, LedgerError, OperationContext};
use wallet_db::{AccountRepository, LedgerRepository, OperationsRepository};
use wallet_shared::config::LedgerSettings;
use wallet_shared::types::CurrencyCode;

/// Entry point for every wallet operation.
///
/// Cheap to clone; clones share the connection pool, the idempotency cache
/// and the converter.
#[derive(Clone)]
pub struct BillingService {
    config: LedgerConfig,
    ledger: LedgerRepository,
    accounts: AccountRepository,
    operations: OperationsRepository,
    guard: IdempotencyGuard,
    converter: Arc<dyn CurrencyConverter>,
}

impl BillingService {
    /// Creates the facade, validating the ledger settings.
    pub fn new(
        db: DatabaseConnection,
        settings: &LedgerSettings,
        guard: IdempotencyGuard,
        converter: Arc<dyn CurrencyConverter>,
    ) -> Result<Self, LedgerConfigError> {
        let config = LedgerConfig::try_from(settings)?;
        Ok(Self::with_config(db, config, guard, converter))
    }

    /// Creates the facade from an already validated configuration.
    #[must_use]
    pub fn with_config(
        db: DatabaseConnection,
        config: LedgerConfig,
        guard: IdempotencyGuard,
        converter: Arc<dyn CurrencyConverter>,
    ) -> Self {
        Self {
            ledger: LedgerRepository::new(db.clone(), config.clone()),
            accounts: AccountRepository::new(db.clone()),
            operations: OperationsRepository::new(db),
            config,
            guard,
            converter,
        }
    }

    /// Ledger rules in effect.
    #[must_use]
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Credits an account, creating it on the first credit.
    #[instrument(skip_all, fields(account_id = %request.account_id))]
    pub async fn credit_user_account(
        &self,
        ctx: &OperationContext,
        request: &CreditRequest,
    ) -> Result<OperationOutcome, LedgerError> {
        let ctx = self.bounded(ctx);
        let credit = validate_credit(request, &self.config).inspect_err(|e| rejected("credit", e))?;

        if self.already_seen(&ctx, &credit.key).await? {
            return Ok(OperationOutcome::AlreadyUsed);
        }
        let outcome = self.ledger.credit(&ctx, &credit).await?;
        self.guard.remember(&credit.key).await;
        Ok(outcome)
    }

    /// Debits an existing account.
    #[instrument(skip_all, fields(account_id = %request.account_id))]
    pub async fn withdraw_user_account(
        &self,
        ctx: &OperationContext,
        request: &WithdrawRequest,
    ) -> Result<OperationOutcome, LedgerError> {
        let ctx = self.bounded(ctx);
        let withdrawal =
            validate_withdraw(request, &self.config).inspect_err(|e| rejected("withdraw", e))?;

        if self.already_seen(&ctx, &withdrawal.key).await? {
            return Ok(OperationOutcome::AlreadyUsed);
        }
        let outcome = self.ledger.withdraw(&ctx, &withdrawal).await?;
        self.guard.remember(&withdrawal.key).await;
        Ok(outcome)
    }

    /// Moves money from one account to another.
    #[instrument(
        skip_all,
        fields(sender_id = %request.sender_id, receiver_id = %request.receiver_id)
    )]
    pub async fn transfer_money_from_user_to_user(
        &self,
        ctx: &OperationContext,
        request: &TransferRequest,
    ) -> Result<OperationOutcome, LedgerError> {
        let ctx = self.bounded(ctx);
        let transfer =
            validate_transfer(request, &self.config).inspect_err(|e| rejected("transfer", e))?;

        if self.already_seen(&ctx, &transfer.key).await? {
            return Ok(OperationOutcome::AlreadyUsed);
        }
        let outcome = self.ledger.transfer(&ctx, &transfer).await?;
        self.guard.remember(&transfer.key).await;
        Ok(outcome)
    }

    /// Reads a balance, converted when another currency is requested.
    #[instrument(skip_all, fields(account_id = %request.account_id))]
    pub async fn get_user_balance(
        &self,
        ctx: &OperationContext,
        request: &BalanceRequest,
    ) -> Result<UserBalance, LedgerError> {
        let ctx = self.bounded(ctx);
        let balance = self.accounts.balance(&ctx, request.account_id).await?;

        let native = self.config.native_currency();
        let target = request
            .currency
            .as_deref()
            .map(CurrencyCode::new)
            .filter(|code| !code.is_empty() && code != native);
        let Some(target) = target else {
            return Ok(UserBalance {
                balance,
                currency: native.clone(),
            });
        };

        let converted = ctx
            .run(async {
                self.converter
                    .convert(balance, &target)
                    .await
                    .map_err(LedgerError::from)
            })
            .await
            .inspect_err(|e| {
                error!(error = %e, currency = %target, "Failed to convert balance");
            })?;

        Ok(UserBalance {
            balance: converted,
            currency: target,
        })
    }

    /// Reads one page of an account's operation history.
    #[instrument(skip_all, fields(account_id = %request.account_id))]
    pub async fn get_user_operations(
        &self,
        ctx: &OperationContext,
        request: &OperationsRequest,
    ) -> Result<OperationsLog, LedgerError> {
        let ctx = self.bounded(ctx);
        let query = OperationsQuery::try_from(request).inspect_err(|e| rejected("operations", e))?;
        self.operations.list(&ctx, &query).await
    }

    fn bounded(&self, ctx: &OperationContext) -> OperationContext {
        match self.config.request_timeout() {
            Some(timeout) => ctx.clone().bounded_by(timeout),
            None => ctx.clone(),
        }
    }

    /// Fast-path lookup. Cache trouble reads as a miss; only an interrupted
    /// context is an error here.
    async fn already_seen(
        &self,
        ctx: &OperationContext,
        key: &IdempotencyKey,
    ) -> Result<bool, LedgerError> {
        let seen = ctx.run(async { Ok(self.guard.seen(key).await) }).await?;
        if seen {
            info!(key = %key, "Operation already done, skipping");
        }
        Ok(seen)
    }
}

fn rejected(operation: &'static str, err: &LedgerError) {
    info!(operation, error = %err, code = err.error_code(), "Request rejected");
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("config", &self.config)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
