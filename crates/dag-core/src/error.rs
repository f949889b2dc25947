//! Error types for dagshell core primitives.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid base58: {0}")] InvalidBase58(String),
    #[error("input too short for checksum")] TooShort,
    #[error("checksum mismatch")] ChecksumMismatch,
    #[error("invalid length: expected {expected}, got {got}")] InvalidLength { expected: usize, got: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address")] Empty,
    #[error("invalid chain alias: {0:?}")] InvalidChainAlias(String),
    #[error(transparent)] Format(#[from] FormatError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("encode: {0}")] Encode(String),
    #[error("decode: {0}")] Decode(String),
    #[error("{0} trailing bytes after payload")] TrailingBytes(usize),
    #[error(transparent)] Format(#[from] FormatError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid secret key length: {0}")] InvalidSecretKey(usize),
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("input index out of bounds: {index} >= {len}")] InputIndexOutOfBounds { index: usize, len: usize },
    #[error("no signers supplied for input {0}")] NoSigners(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("network id mismatch: tx {got}, context {expected}")] NetworkMismatch { expected: u32, got: u32 },
    #[error("chain id mismatch")] ChainMismatch,
    #[error("transaction has no inputs")] NoInputs,
    #[error("transaction has no outputs")] NoOutputs,
    #[error("duplicate input: {0}")] DuplicateInput(String),
    #[error("zero-amount output at index {0}")] ZeroAmountOutput(usize),
    #[error("output {index} has threshold {threshold} over {addresses} addresses")] InvalidThreshold { index: usize, threshold: u32, addresses: usize },
    #[error("output {0} addresses are not sorted and unique")] UnsortedAddresses(usize),
    #[error("amount overflow")] AmountOverflow,
    #[error("inputs {inputs} do not cover outputs {outputs} plus fee {fee}")] InsufficientInputs { inputs: u64, outputs: u64, fee: u64 },
    #[error("inputs {inputs} exceed outputs {outputs} plus fee {fee}")] ExcessInputs { inputs: u64, outputs: u64, fee: u64 },
    #[error("input {0} carries no credentials")] MissingCredentials(usize),
    #[error("input {index}: {source}")] BadCredential { index: usize, source: CryptoError },
    #[error("input {0} spends an unknown UTXO")] UnknownUtxo(usize),
    #[error("input {index} amount {got} does not match UTXO amount {expected}")] AmountMismatch { index: usize, expected: u64, got: u64 },
    #[error("input {0} signed by a key that does not own the UTXO")] ForeignSigner(usize),
    #[error("input {index} has {got} distinct signers, threshold is {threshold}")] ThresholdNotMet { index: usize, threshold: u32, got: usize },
}
