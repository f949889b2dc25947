//! Wallet error types.

use dag_core::error::{CodecError, CryptoError, ValidationError};
use thiserror::Error;

/// Errors that can occur in wallet and registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet is registered under the name.
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    /// A wallet is already registered under the name.
    #[error("wallet already exists: {0}")]
    DuplicateName(String),

    /// Address text could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Spendable UTXOs do not cover the amount plus fee.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Spendable total in minimal units.
        have: u64,
        /// Amount plus fee.
        need: u64,
    },

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Threshold is zero or larger than the destination set.
    #[error("invalid threshold {threshold} for {addresses} destination addresses")]
    InvalidThreshold { threshold: u32, addresses: usize },

    /// A transaction payload could not be decoded.
    #[error("transaction decode: {0}")]
    TxDecode(CodecError),

    /// A UTXO payload could not be decoded.
    #[error("utxo decode: {0}")]
    UtxoDecode(CodecError),

    /// The built transaction failed verification.
    #[error(transparent)]
    Verification(#[from] ValidationError),

    /// Private key material could not be imported.
    #[error("key import: {0}")]
    KeyImport(String),

    /// No keychain key can sign for an owning address.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// JSON (de)serialization failure.
    #[error("serialization: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Cryptographic error from dag-core.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
