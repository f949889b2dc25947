//! # dag-core
//! Foundation types for the dagshell wallet engine: identifiers, UTXO and
//! transaction records, the CB58 text encoding, the binary wire codec,
//! Ed25519 signing and transaction verification.

pub mod address;
pub mod cb58;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod types;
pub mod validation;
