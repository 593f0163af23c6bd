//! Shared types and configuration for the wallet ledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed account identifiers
//! - Currency codes and monetary amounts
//! - Pagination types for the operation history
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
