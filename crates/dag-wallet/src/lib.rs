//! # dag-wallet: in-memory UTXO wallets for dagshell.
//!
//! Named wallets live for the lifetime of the process. Each tracks a UTXO
//! set and a keychain, builds and signs spend transactions, and can be
//! compared against another wallet for test assertions.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`keys`]: imported spending keys
//! - [`utxo_set`]: the UTXO set and its merge/diff algebra
//! - [`coin_selection`]: deterministic selection ordered by UTXO id
//! - [`builder`]: transaction construction and signing
//! - [`wallet`]: high-level wallet composition
//! - [`registry`]: name → wallet table shared across commands

pub mod builder;
pub mod coin_selection;
pub mod error;
pub mod keys;
pub mod registry;
pub mod utxo_set;
pub mod wallet;

pub use builder::{Destination, TransactionBuilder};
pub use coin_selection::{CoinSelection, CoinSelector};
pub use error::WalletError;
pub use keys::KeyChain;
pub use registry::{SharedWallet, WalletRegistry};
pub use utxo_set::UtxoSet;
pub use wallet::Wallet;
