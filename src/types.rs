//! Re-exported types from external crates for convenience.
//!
//! These types are commonly used in this crate and are re-exported here
//! so users don't need to add these dependencies to their `Cargo.toml`.

/// Ethereum address type and the [`address!`] macro for compile-time address literals.
/// [`ChainId`] is a type alias for `u64` representing EVM chain IDs.
pub use alloy::primitives::{Address, ChainId, address};
/// Date and time types for timestamp filters.
pub use chrono::{DateTime, Utc};
/// Arbitrary precision decimal type for prices, sizes, and amount filters.
pub use rust_decimal::Decimal;
/// Upstream entities (markets, events, order books, trades, ...) are passed through untouched.
pub use serde_json::Value;
