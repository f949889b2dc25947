//! CB58: base58 text encoding with a 4-byte SHA-256 checksum suffix.
//!
//! `encode(payload) = base58(payload || sha256(payload)[28..32])`. Every byte
//! payload crossing the RPC boundary (transactions, UTXOs, ids, keys) uses
//! this form.

use sha2::{Digest, Sha256};

use crate::error::FormatError;

/// Number of checksum bytes appended before base58 encoding.
pub const CHECKSUM_LEN: usize = 4;

/// Encode bytes as a CB58 string.
pub fn encode(payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum(payload));
    bs58::encode(buf).into_string()
}

/// Decode a CB58 string, verifying and stripping the checksum.
pub fn decode(s: &str) -> Result<Vec<u8>, FormatError> {
    let mut raw = bs58::decode(s.trim())
        .into_vec()
        .map_err(|e| FormatError::InvalidBase58(e.to_string()))?;
    if raw.len() < CHECKSUM_LEN {
        return Err(FormatError::TooShort);
    }
    let split = raw.len() - CHECKSUM_LEN;
    if raw[split..] != checksum(&raw[..split]) {
        return Err(FormatError::ChecksumMismatch);
    }
    raw.truncate(split);
    Ok(raw)
}

/// Decode a CB58 string into a fixed-size array.
pub fn decode_array<const N: usize>(s: &str) -> Result<[u8; N], FormatError> {
    let bytes = decode(s)?;
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| FormatError::InvalidLength { expected: N, got })
}

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_payload_encodes_checksum_only() {
        let s = encode(&[]);
        assert_eq!(decode(&s).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_rejects_flipped_character() {
        let mut s = encode(b"dagshell");
        let last = s.pop().unwrap();
        s.push(if last == '2' { '3' } else { '2' });
        assert_eq!(decode(&s), Err(FormatError::ChecksumMismatch));
    }

    #[test]
    fn decode_rejects_non_base58() {
        assert!(matches!(decode("0OIl"), Err(FormatError::InvalidBase58(_))));
    }

    #[test]
    fn decode_rejects_short_input() {
        let s = bs58::encode([1u8, 2]).into_string();
        assert_eq!(decode(&s), Err(FormatError::TooShort));
    }

    #[test]
    fn decode_array_checks_length() {
        let s = encode(&[7u8; 20]);
        assert_eq!(decode_array::<20>(&s).unwrap(), [7u8; 20]);
        assert_eq!(
            decode_array::<32>(&s),
            Err(FormatError::InvalidLength { expected: 32, got: 20 })
        );
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        let s = format!("  {}\n", encode(b"abc"));
        assert_eq!(decode(&s).unwrap(), b"abc");
    }

    proptest! {
        #[test]
        fn any_payload_survives(payload in proptest::collection::vec(any::<u8>(), 0..128)) {
            prop_assert_eq!(decode(&encode(&payload)).unwrap(), payload);
        }
    }
}
