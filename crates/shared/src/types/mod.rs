//! Common types used across the application.

pub mod currency;
pub mod id;
pub mod pagination;

pub use currency::CurrencyCode;
pub use id::AccountId;
pub use pagination::{PageError, PageRequest, PageResponse, UNBOUNDED_LIMIT};

#[cfg(test)]
mod pagination_props;
