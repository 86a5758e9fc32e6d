//! Simulated stock trading service: a per-user cash ledger, share
//! possessions, an append-only transaction log, and portfolio value
//! reconstruction against an external market-data provider.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod ledger;
pub mod oracle;
pub mod persistence;
pub mod queries;
pub mod types;
