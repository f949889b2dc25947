//! Imported spending keys.
//!
//! Keys are imported, never derived from a seed: a test shell hands the
//! wallet whatever funded keys the network was bootstrapped with. The
//! keychain is keyed by short id so that address order is the iteration
//! order, which keeps signing and change selection deterministic.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroizing;

use dag_core::address::Address;
use dag_core::cb58;
use dag_core::crypto::KeyPair;
use dag_core::types::ShortId;

use crate::error::WalletError;

/// Private keys held by a wallet, indexed by the address they control.
#[derive(Clone, Default)]
pub struct KeyChain {
    keys: BTreeMap<ShortId, KeyPair>,
}

impl KeyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key. Returns its address; importing the same key twice is a no-op.
    pub fn import(&mut self, keypair: KeyPair) -> ShortId {
        let id = keypair.short_id();
        self.keys.entry(id).or_insert(keypair);
        id
    }

    /// Parse a CB58-encoded 32-byte secret and import it.
    pub fn import_cb58(&mut self, encoded: &str) -> Result<ShortId, WalletError> {
        let secret = Zeroizing::new(
            cb58::decode(encoded).map_err(|e| WalletError::KeyImport(e.to_string()))?,
        );
        let keypair =
            KeyPair::from_secret_slice(&secret).map_err(|e| WalletError::KeyImport(e.to_string()))?;
        Ok(self.import(keypair))
    }

    pub fn keypair(&self, id: &ShortId) -> Option<&KeyPair> {
        self.keys.get(id)
    }

    pub fn contains(&self, id: &ShortId) -> bool {
        self.keys.contains_key(id)
    }

    /// Controlled addresses, ascending.
    pub fn short_ids(&self) -> impl Iterator<Item = ShortId> + '_ {
        self.keys.keys().copied()
    }

    /// Controlled addresses rendered with `chain_alias`, ascending.
    pub fn addresses(&self, chain_alias: &str) -> Vec<Address> {
        self.short_ids()
            .map(|id| Address::new(chain_alias, id))
            .collect()
    }

    /// The lowest controlled address, used for change.
    pub fn first(&self) -> Option<ShortId> {
        self.keys.keys().next().copied()
    }

    /// Keys able to sign for `owners`, in address order, at most `needed`.
    pub fn signers_for<'a>(&'a self, owners: &[ShortId], needed: usize) -> Vec<&'a KeyPair> {
        owners
            .iter()
            .filter_map(|id| self.keys.get(id))
            .take(needed)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Encode a key pair's secret as CB58 text, the form `import_cb58` accepts.
pub fn export_secret(keypair: &KeyPair) -> String {
    let secret = Zeroizing::new(keypair.secret_bytes());
    cb58::encode(secret.as_slice())
}

impl fmt::Debug for KeyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyChain")
            .field("keys", &self.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_is_idempotent() {
        let mut kc = KeyChain::new();
        let kp = KeyPair::from_secret_bytes([3; 32]);
        let a = kc.import(kp.clone());
        let b = kc.import(kp);
        assert_eq!(a, b);
        assert_eq!(kc.len(), 1);
    }

    #[test]
    fn cb58_secret_roundtrips_through_import() {
        let kp = KeyPair::from_secret_bytes([9; 32]);
        let mut kc = KeyChain::new();
        let id = kc.import_cb58(&export_secret(&kp)).unwrap();
        assert_eq!(id, kp.short_id());
        assert!(kc.contains(&id));
    }

    #[test]
    fn malformed_secret_is_rejected() {
        let mut kc = KeyChain::new();
        assert!(matches!(kc.import_cb58("not a key"), Err(WalletError::KeyImport(_))));
        let short = cb58::encode(&[1u8; 16]);
        assert!(matches!(kc.import_cb58(&short), Err(WalletError::KeyImport(_))));
        assert!(kc.is_empty());
    }

    #[test]
    fn addresses_are_sorted() {
        let mut kc = KeyChain::new();
        for b in [5u8, 1, 9, 3] {
            kc.import(KeyPair::from_secret_bytes([b; 32]));
        }
        let ids: Vec<_> = kc.short_ids().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(kc.first(), sorted.first().copied());
        assert!(kc.addresses("X").iter().all(|a| a.chain_alias() == Some("X")));
    }

    #[test]
    fn signers_limited_to_threshold() {
        let mut kc = KeyChain::new();
        let a = kc.import(KeyPair::from_secret_bytes([1; 32]));
        let b = kc.import(KeyPair::from_secret_bytes([2; 32]));
        let stranger = ShortId([0xEE; 20]);
        let mut owners = vec![a, b, stranger];
        owners.sort();
        assert_eq!(kc.signers_for(&owners, 1).len(), 1);
        assert_eq!(kc.signers_for(&owners, 3).len(), 2);
    }

    #[test]
    fn debug_shows_count_only() {
        let mut kc = KeyChain::new();
        kc.import(KeyPair::from_secret_bytes([1; 32]));
        assert_eq!(format!("{kc:?}"), "KeyChain { keys: 1 }");
    }
}
