//! Concurrency tests for the ledger transaction engine.
//!
//! These tests verify:
//! - No lost updates under parallel credits and withdrawals
//! - Balances never go negative
//! - Transfers conserve money and never deadlock
//! - A reused idempotency token applies exactly once
//!
//! Run with a Postgres database reachable through `DATABASE_URL`.

#![allow(clippy::uninlined_format_args)]

mod common;

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tokio::sync::Barrier;
use wallet_core::ledger::OperationOutcome;
use wallet_core::{LedgerError, OperationContext};
use wallet_db::entities::ledger_entries;
use wallet_shared::types::AccountId;

use common::{TestDb, credit, transfer, unique_account_id, unique_token, withdrawal};

async fn entry_count(t: &TestDb, account_id: AccountId) -> u64 {
    ledger_entries::Entity::find()
        .filter(ledger_entries::Column::AccountId.eq(account_id.into_inner()))
        .count(&t.db)
        .await
        .unwrap()
}

async fn seed(t: &TestDb, account_id: AccountId, amount: Decimal) {
    t.ledger
        .credit(&OperationContext::new(), &credit(account_id, amount, &unique_token()))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_credits_no_lost_updates() {
    let Some(t) = common::setup().await else {
        println!("Skipping test - database not available");
        return;
    };

    const TASKS: usize = 10;
    let account_id = unique_account_id();
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let t = t.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                t.ledger
                    .credit(
                        &OperationContext::new(),
                        &credit(account_id, dec!(2.50), &unique_token()),
                    )
                    .await
            })
        })
        .collect();

    for result in join_all(handles).await {
        assert!(result.unwrap().is_ok());
    }

    let balance = t.accounts.balance(&OperationContext::new(), account_id).await.unwrap();
    assert_eq!(balance, dec!(25.00));
    assert_eq!(entry_count(&t, account_id).await, TASKS as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    let Some(t) = common::setup().await else {
        println!("Skipping test - database not available");
        return;
    };

    const TASKS: usize = 12;
    let account_id = unique_account_id();
    seed(&t, account_id, dec!(50)).await;
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let t = t.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                t.ledger
                    .withdraw(
                        &OperationContext::new(),
                        &withdrawal(account_id, dec!(10), &unique_token()),
                    )
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for result in join_all(handles).await {
        match result.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert_eq!(e, LedgerError::InsufficientFunds(account_id)),
        }
    }

    assert_eq!(succeeded, 5);
    let balance = t.accounts.balance(&OperationContext::new(), account_id).await.unwrap();
    assert_eq!(balance, Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_conserve_money() {
    let Some(t) = common::setup().await else {
        println!("Skipping test - database not available");
        return;
    };

    let accounts: Vec<AccountId> = (0..4).map(|_| unique_account_id()).collect();
    for &id in &accounts {
        seed(&t, id, dec!(100)).await;
    }

    const TASKS: usize = 24;
    let barrier = Arc::new(Barrier::new(TASKS));
    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let t = t.clone();
            let barrier = Arc::clone(&barrier);
            let sender = accounts[i % accounts.len()];
            let receiver = accounts[(i * 3 + 1) % accounts.len()];
            tokio::spawn(async move {
                barrier.wait().await;
                t.ledger
                    .transfer(
                        &OperationContext::new(),
                        &transfer(sender, receiver, dec!(7.25), &unique_token()),
                    )
                    .await
            })
        })
        .collect();

    for result in join_all(handles).await {
        match result.unwrap() {
            Ok(_) | Err(LedgerError::InsufficientFunds(_)) => {}
            Err(e) => panic!("unexpected transfer failure: {e}"),
        }
    }

    let ctx = OperationContext::new();
    let mut total = Decimal::ZERO;
    for &id in &accounts {
        let balance = t.accounts.balance(&ctx, id).await.unwrap();
        assert!(balance >= Decimal::ZERO);
        total += balance;
    }
    assert_eq!(total, dec!(400));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_direction_transfers_complete() {
    let Some(t) = common::setup().await else {
        println!("Skipping test - database not available");
        return;
    };

    let (a, b) = (unique_account_id(), unique_account_id());
    seed(&t, a, dec!(1000)).await;
    seed(&t, b, dec!(1000)).await;

    const ROUNDS: usize = 10;
    let barrier = Arc::new(Barrier::new(ROUNDS * 2));
    let handles: Vec<_> = (0..ROUNDS * 2)
        .map(|i| {
            let t = t.clone();
            let barrier = Arc::clone(&barrier);
            let (sender, receiver) = if i % 2 == 0 { (a, b) } else { (b, a) };
            tokio::spawn(async move {
                barrier.wait().await;
                t.ledger
                    .transfer(
                        &OperationContext::new(),
                        &transfer(sender, receiver, dec!(1), &unique_token()),
                    )
                    .await
            })
        })
        .collect();

    for result in join_all(handles).await {
        assert!(result.unwrap().is_ok(), "transfer should not deadlock");
    }

    let ctx = OperationContext::new();
    assert_eq!(t.accounts.balance(&ctx, a).await.unwrap(), dec!(1000));
    assert_eq!(t.accounts.balance(&ctx, b).await.unwrap(), dec!(1000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_token_credit_applies_once() {
    let Some(t) = common::setup().await else {
        println!("Skipping test - database not available");
        return;
    };

    const TASKS: usize = 8;
    let account_id = unique_account_id();
    seed(&t, account_id, dec!(1)).await;
    let token = unique_token();
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let t = t.clone();
            let barrier = Arc::clone(&barrier);
            let order = credit(account_id, dec!(10), &token);
            tokio::spawn(async move {
                barrier.wait().await;
                t.ledger.credit(&OperationContext::new(), &order).await
            })
        })
        .collect();

    let outcomes: Vec<OperationOutcome> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    let done = outcomes.iter().filter(|o| !o.is_already_used()).count();
    assert_eq!(done, 1);
    assert_eq!(outcomes.len() - done, TASKS - 1);

    let balance = t.accounts.balance(&OperationContext::new(), account_id).await.unwrap();
    assert_eq!(balance, dec!(11));
    assert_eq!(entry_count(&t, account_id).await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_token_transfer_applies_once() {
    let Some(t) = common::setup().await else {
        println!("Skipping test - database not available");
        return;
    };

    const TASKS: usize = 8;
    let (a, b) = (unique_account_id(), unique_account_id());
    seed(&t, a, dec!(100)).await;
    seed(&t, b, dec!(100)).await;
    let token = unique_token();
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let t = t.clone();
            let barrier = Arc::clone(&barrier);
            let order = transfer(a, b, dec!(30), &token);
            tokio::spawn(async move {
                barrier.wait().await;
                t.ledger.transfer(&OperationContext::new(), &order).await
            })
        })
        .collect();

    let outcomes: Vec<OperationOutcome> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_already_used()).count(), TASKS - 1);

    let ctx = OperationContext::new();
    assert_eq!(t.accounts.balance(&ctx, a).await.unwrap(), dec!(70));
    assert_eq!(t.accounts.balance(&ctx, b).await.unwrap(), dec!(130));
    assert_eq!(entry_count(&t, a).await, 2);
    assert_eq!(entry_count(&t, b).await, 2);
}
