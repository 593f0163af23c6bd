//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod ledger;
pub mod operations;

pub use account::AccountRepository;
pub use ledger::LedgerRepository;
pub use operations::OperationsRepository;
