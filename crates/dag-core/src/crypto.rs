//! Ed25519 key pairs, address derivation and transaction signing.
//!
//! # Signing scheme
//!
//! Each input is signed over a **sighash** that commits to:
//! - network id and chain id
//! - all inputs (source tx id, output index, amount)
//! - all outputs (amount, lock time, threshold, addresses)
//! - the index of the input being signed
//!
//! Credentials are excluded from the sighash, so inputs can be signed in any
//! order and by several keys independently.

use ed25519_dalek::{Signer, Verifier};
use std::fmt;

use crate::error::CryptoError;
use crate::types::{Credential, Hash256, SHORT_ID_LEN, ShortId, Transaction};

/// Domain separator mixed into every sighash.
const SIGHASH_CONTEXT: &[u8] = b"dagshell-sighash-v1";

/// Ed25519 key pair. The secret is zeroized on drop by ed25519-dalek.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Generate a random key pair from the OS RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a key pair from 32 bytes of secret key material.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes),
        }
    }

    /// Create a key pair from a byte slice, checking its length.
    pub fn from_secret_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSecretKey(bytes.len()))?;
        Ok(Self::from_secret_bytes(arr))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// The address this key controls.
    pub fn short_id(&self) -> ShortId {
        self.public_key().short_id()
    }

    /// Raw secret key bytes. Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_secret_bytes(self.secret_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("short_id", &self.short_id().to_string())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let vk = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key: vk })
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Address derivation: the first 20 bytes of BLAKE3(public key).
    pub fn short_id(&self) -> ShortId {
        short_id(&self.to_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

/// Derive a short id from raw public key bytes.
pub fn short_id(pubkey_bytes: &[u8; 32]) -> ShortId {
    let digest = blake3::hash(pubkey_bytes);
    let mut id = [0u8; SHORT_ID_LEN];
    id.copy_from_slice(&digest.as_bytes()[..SHORT_ID_LEN]);
    ShortId(id)
}

/// Compute the sighash for one input of `tx`.
pub fn signing_hash(tx: &Transaction, input_index: usize) -> Result<Hash256, CryptoError> {
    if input_index >= tx.inputs.len() {
        return Err(CryptoError::InputIndexOutOfBounds {
            index: input_index,
            len: tx.inputs.len(),
        });
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(SIGHASH_CONTEXT);
    hasher.update(&tx.network_id.to_le_bytes());
    hasher.update(tx.chain_id.as_bytes());

    hasher.update(&(tx.inputs.len() as u64).to_le_bytes());
    for input in &tx.inputs {
        hasher.update(input.tx_id.as_bytes());
        hasher.update(&input.output_index.to_le_bytes());
        hasher.update(&input.amount.to_le_bytes());
    }

    hasher.update(&(tx.outputs.len() as u64).to_le_bytes());
    for output in &tx.outputs {
        hasher.update(&output.amount.to_le_bytes());
        hasher.update(&output.lock_time.to_le_bytes());
        hasher.update(&output.threshold.to_le_bytes());
        hasher.update(&(output.addresses.len() as u64).to_le_bytes());
        for addr in &output.addresses {
            hasher.update(addr.as_bytes());
        }
    }

    hasher.update(&(input_index as u64).to_le_bytes());
    Ok(Hash256(hasher.finalize().into()))
}

/// Sign one input with every key in `signers`, replacing its credentials.
pub fn sign_input(
    tx: &mut Transaction,
    input_index: usize,
    signers: &[&KeyPair],
) -> Result<(), CryptoError> {
    if signers.is_empty() {
        return Err(CryptoError::NoSigners(input_index));
    }
    let sighash = signing_hash(tx, input_index)?;
    let credentials = signers
        .iter()
        .map(|kp| Credential {
            public_key: kp.public_key().to_bytes().to_vec(),
            signature: kp.sign(sighash.as_bytes()).to_vec(),
        })
        .collect();
    tx.inputs[input_index].credentials = credentials;
    Ok(())
}

/// Verify every credential on one input and return the signers' short ids.
pub fn verify_input(tx: &Transaction, input_index: usize) -> Result<Vec<ShortId>, CryptoError> {
    let sighash = signing_hash(tx, input_index)?;
    tx.inputs[input_index]
        .credentials
        .iter()
        .map(|cred| {
            let pk_bytes: [u8; 32] = cred
                .public_key
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidPublicKey)?;
            let sig_bytes: [u8; 64] = cred
                .signature
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidSignature)?;
            let pk = PublicKey::from_bytes(&pk_bytes)?;
            pk.verify(sighash.as_bytes(), &sig_bytes)?;
            Ok(pk.short_id())
        })
        .collect()
}
