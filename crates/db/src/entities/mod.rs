//! `SeaORM` entities.

pub mod accounts;
pub mod ledger_entries;

pub mod prelude {
    //! Entity re-exports.
    pub use super::accounts::Entity as Accounts;
    pub use super::ledger_entries::Entity as LedgerEntries;
}
