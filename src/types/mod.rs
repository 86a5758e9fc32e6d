//! Domain types shared across the ledger, persistence, and API layers.

pub mod possession;
pub mod transaction;

/// Cash amounts and prices in integer cents.
pub type Cents = i64;

/// Whole-share quantity.
pub type ShareCount = i64;
