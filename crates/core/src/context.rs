//! Per-operation deadline and cancellation.
//!
//! Every ledger operation runs under an [`OperationContext`]. Cancellation
//! is reported as [`LedgerError::OperationCancelled`] and an expired
//! deadline as [`LedgerError::OperationTimedOut`], so callers can tell
//! the two apart.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ledger::LedgerError;

/// Deadline and cancellation signal carried by a single operation.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl OperationContext {
    /// Context with no deadline and a fresh cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context expiring `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Context expiring at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token, e.g. with a child of a request token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Tightens the deadline to `timeout` from now unless one is already sooner.
    #[must_use]
    pub fn bounded_by(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        });
        self
    }

    /// Token that cancels this operation.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels the operation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the interruption error if the operation must stop now.
    pub fn check(&self) -> Result<(), LedgerError> {
        if self.cancel.is_cancelled() {
            return Err(LedgerError::OperationCancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(LedgerError::OperationTimedOut);
        }
        Ok(())
    }

    /// Interruption error for a failure that may have been caused by the
    /// context, e.g. a statement aborted by the server-side timeout.
    #[must_use]
    pub fn interruption(&self) -> Option<LedgerError> {
        self.check().err()
    }

    /// Runs `fut` until it completes, the token is cancelled, or the
    /// deadline passes. An interrupted future is dropped.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        self.check()?;

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| LedgerError::OperationTimedOut)?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(LedgerError::OperationCancelled),
            result = bounded => result,
        }
    }
}
