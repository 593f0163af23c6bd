//! Idempotency tokens.
//!
//! A token may be consumed by at most one operation of a given kind. The
//! ledger store is authoritative: it keeps a unique constraint over the
//! token stored on each entry. The cache in [`cache`] only short-circuits
//! obvious repeats and is never trusted to allow an operation.

pub mod cache;
pub mod guard;

use std::fmt;

use crate::ledger::{LedgerError, OperationKind};

pub use cache::{CacheError, IdempotencyCache, MokaIdempotencyCache, NoopIdempotencyCache};
pub use guard::IdempotencyGuard;

/// A caller token namespaced by operation kind.
///
/// Namespacing means a credit and a transfer sent with the same raw token
/// do not collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey {
    kind: OperationKind,
    token: String,
}

impl IdempotencyKey {
    /// Builds a key, rejecting blank tokens.
    ///
    /// The token is kept exactly as sent, so `"t"` and `" t"` are
    /// different tokens.
    pub fn new(kind: OperationKind, token: &str) -> Result<Self, LedgerError> {
        if token.trim().is_empty() {
            return Err(LedgerError::MissingIdempotencyToken);
        }
        Ok(Self {
            kind,
            token: token.to_string(),
        })
    }

    /// Operation kind the token belongs to.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The raw caller token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Key used for the fast-path cache, `<kind>:<token>`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.kind, self.token)
    }

    /// Token stored on the entry of a single-entry operation.
    ///
    /// For transfers this is the sender-side token, which is enough to
    /// detect reuse because both entries are written atomically.
    #[must_use]
    pub fn entry_token(&self) -> String {
        match self.kind {
            OperationKind::Transfer => self.transfer_tokens().0,
            OperationKind::Credit | OperationKind::Withdraw => self.cache_key(),
        }
    }

    /// Tokens stored on the sender and receiver entries of a transfer.
    #[must_use]
    pub fn transfer_tokens(&self) -> (String, String) {
        let base = self.cache_key();
        (format!("{base}:out"), format!("{base}:in"))
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.token)
    }
}
