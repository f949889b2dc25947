//! Core ledger types: identifiers, UTXOs, transactions.
//!
//! Identifiers render as CB58 strings both in `Display` and in JSON, so an
//! exported UTXO set reads the same way the node reports it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::cb58;
use crate::error::{CodecError, FormatError};

/// Length of a short id (address payload) in bytes.
pub const SHORT_ID_LEN: usize = 20;

macro_rules! cb58_id {
    ($name:ident, $len:expr) => {
        impl $name {
            /// Return the underlying bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Check if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&cb58::encode(&self.0))
            }
        }

        impl FromStr for $name {
            type Err = FormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                cb58::decode_array::<{ $len }>(s).map(Self)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A 32-byte identifier: transaction ids and chain ids.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The all-zero id.
    pub const ZERO: Self = Self([0u8; 32]);
}

cb58_id!(Hash256, 32);

/// A 20-byte short id identifying a key's address.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct ShortId(pub [u8; SHORT_ID_LEN]);

cb58_id!(ShortId, SHORT_ID_LEN);

/// Identifier of a UTXO, derived from its source transaction and output index.
///
/// Ordered by raw bytes; coin selection relies on this total order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
pub struct UtxoId(pub [u8; 32]);

impl UtxoId {
    /// `BLAKE3(tx_id || output_index_le)`.
    pub fn derive(tx_id: &Hash256, output_index: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(tx_id.as_bytes());
        hasher.update(&output_index.to_le_bytes());
        Self(hasher.finalize().into())
    }
}

cb58_id!(UtxoId, 32);

/// An output: value plus the conditions under which it may be spent.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TxOutput {
    /// Amount in the ledger's minimal unit.
    pub amount: u64,
    /// Unix time (seconds) before which the output cannot be spent. 0 = unlocked.
    pub lock_time: u64,
    /// Number of distinct owning keys that must sign a spend.
    pub threshold: u32,
    /// Owning addresses, sorted and unique.
    pub addresses: Vec<ShortId>,
}

impl TxOutput {
    /// Whether the lock time has passed at `now` (unix seconds).
    pub fn is_unlocked(&self, now: u64) -> bool {
        now >= self.lock_time
    }
}

/// An unspent output as reported by the node.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Utxo {
    /// Transaction that created the output.
    pub tx_id: Hash256,
    /// Position of the output in that transaction.
    pub output_index: u32,
    /// The output itself.
    pub output: TxOutput,
}

impl Utxo {
    /// The identifier this UTXO is keyed by.
    pub fn id(&self) -> UtxoId {
        UtxoId::derive(&self.tx_id, self.output_index)
    }

    pub fn amount(&self) -> u64 {
        self.output.amount
    }
}

/// One signature authorizing an input.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Credential {
    /// Ed25519 public key (32 bytes).
    pub public_key: Vec<u8>,
    /// Ed25519 signature over the input's sighash (64 bytes).
    pub signature: Vec<u8>,
}

/// A transaction input consuming a UTXO.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct TxInput {
    /// Source transaction of the consumed UTXO.
    pub tx_id: Hash256,
    /// Output index of the consumed UTXO.
    pub output_index: u32,
    /// Amount of the consumed UTXO.
    pub amount: u64,
    /// Signatures; empty until signed.
    pub credentials: Vec<Credential>,
}

impl TxInput {
    /// Identifier of the UTXO this input spends.
    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::derive(&self.tx_id, self.output_index)
    }
}

/// A transaction bound to one network and chain.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    pub network_id: u32,
    pub chain_id: Hash256,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Transaction id: BLAKE3 of the canonical encoding of the signed transaction.
    pub fn tx_id(&self) -> Result<Hash256, CodecError> {
        let encoded = crate::codec::encode_tx(self)?;
        Ok(Hash256(blake3::hash(&encoded).into()))
    }

    /// Ids of all UTXOs consumed, in input order.
    pub fn input_ids(&self) -> impl Iterator<Item = UtxoId> + '_ {
        self.inputs.iter().map(TxInput::utxo_id)
    }

    /// Sum of input amounts. `None` on overflow.
    pub fn total_input_amount(&self) -> Option<u64> {
        self.inputs
            .iter()
            .try_fold(0u64, |acc, input| acc.checked_add(input.amount))
    }

    /// Sum of output amounts. `None` on overflow.
    pub fn total_output_amount(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.amount))
    }
}
