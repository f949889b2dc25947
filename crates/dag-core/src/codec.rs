//! Binary wire codec for transactions and UTXOs.
//!
//! bincode with the standard configuration. Decoding rejects trailing
//! bytes so that every accepted payload has exactly one encoding.

use crate::cb58;
use crate::error::CodecError;
use crate::types::{Transaction, Utxo};

fn encode<T: bincode::Encode>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| CodecError::Encode(e.to_string()))
}

fn decode<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T, CodecError> {
    let (value, read) = bincode::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    if read != bytes.len() {
        return Err(CodecError::TrailingBytes(bytes.len() - read));
    }
    Ok(value)
}

pub fn encode_tx(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    encode(tx)
}

pub fn decode_tx(bytes: &[u8]) -> Result<Transaction, CodecError> {
    decode(bytes)
}

pub fn encode_utxo(utxo: &Utxo) -> Result<Vec<u8>, CodecError> {
    encode(utxo)
}

pub fn decode_utxo(bytes: &[u8]) -> Result<Utxo, CodecError> {
    decode(bytes)
}

/// Encode a transaction as the CB58 string sent over RPC.
pub fn tx_to_cb58(tx: &Transaction) -> Result<String, CodecError> {
    Ok(cb58::encode(&encode_tx(tx)?))
}

/// Parse a CB58 transaction string.
pub fn tx_from_cb58(s: &str) -> Result<Transaction, CodecError> {
    decode_tx(&cb58::decode(s)?)
}

/// Encode a UTXO as the CB58 string a node returns from `getUTXOs`.
pub fn utxo_to_cb58(utxo: &Utxo) -> Result<String, CodecError> {
    Ok(cb58::encode(&encode_utxo(utxo)?))
}

/// Parse a CB58 UTXO string.
pub fn utxo_from_cb58(s: &str) -> Result<Utxo, CodecError> {
    decode_utxo(&cb58::decode(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::types::{Credential, Hash256, ShortId, TxInput, TxOutput};

    fn sample_utxo() -> Utxo {
        Utxo {
            tx_id: Hash256([5; 32]),
            output_index: 2,
            output: TxOutput {
                amount: 1_000,
                lock_time: 0,
                threshold: 1,
                addresses: vec![ShortId([8; 20])],
            },
        }
    }

    fn sample_tx() -> Transaction {
        Transaction {
            network_id: 3,
            chain_id: Hash256([4; 32]),
            inputs: vec![TxInput {
                tx_id: Hash256([5; 32]),
                output_index: 2,
                amount: 1_000,
                credentials: vec![Credential {
                    public_key: vec![1; 32],
                    signature: vec![2; 64],
                }],
            }],
            outputs: vec![sample_utxo().output],
        }
    }

    #[test]
    fn tx_survives_cb58_transport() {
        let tx = sample_tx();
        assert_eq!(tx_from_cb58(&tx_to_cb58(&tx).unwrap()).unwrap(), tx);
    }

    #[test]
    fn utxo_survives_cb58_transport() {
        let utxo = sample_utxo();
        assert_eq!(utxo_from_cb58(&utxo_to_cb58(&utxo).unwrap()).unwrap(), utxo);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode_utxo(&sample_utxo()).unwrap();
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(decode_utxo(&bytes), Err(CodecError::TrailingBytes(2)));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let bytes = encode_tx(&sample_tx()).unwrap();
        assert!(matches!(
            decode_tx(&bytes[..bytes.len() / 2]),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn bad_checksum_surfaces_format_error() {
        let err = utxo_from_cb58("1111111").unwrap_err();
        assert_eq!(err, CodecError::Format(FormatError::ChecksumMismatch));
    }

    #[test]
    fn tx_id_changes_with_credentials() {
        let tx = sample_tx();
        let mut unsigned = tx.clone();
        unsigned.inputs[0].credentials.clear();
        assert_ne!(tx.tx_id().unwrap(), unsigned.tx_id().unwrap());
    }
}
