//! # dag-sync: talk to a ledger node over JSON-RPC.
//!
//! Pulls UTXOs for a wallet's addresses, issues transactions and queries
//! transaction status and balances. Every call is bounded by the
//! configured request timeout and can be cancelled by dropping its future.
//!
//! # Modules
//!
//! - [`config`]: endpoint, chain alias, namespace, asset id, timeout
//! - [`error`]: `SyncError` enum
//! - [`types`]: request keys and fixed response schemas
//! - [`client`]: the RPC client
//! - [`refresh`]: decoding and merging a `getUTXOs` reply

pub mod client;
pub mod config;
pub mod error;
pub mod refresh;
pub mod types;

pub use client::SyncClient;
pub use config::SyncConfig;
pub use error::SyncError;
pub use refresh::{RefreshFailure, RefreshReport};
