//! High-level wallet composition.
//!
//! A [`Wallet`] binds a keychain and a UTXO set to one network, chain and
//! fee. It is the unit the registry hands out and the shell operates on.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use dag_core::crypto::KeyPair;
use dag_core::types::{Hash256, ShortId, Transaction, Utxo, UtxoId};
use dag_core::validation::{VerifyContext, verify_exact_fee, verify_spends, verify_transaction};

use crate::builder::{Destination, TransactionBuilder};
use crate::coin_selection::CoinSelector;
use crate::error::WalletError;
use crate::keys::KeyChain;
use crate::utxo_set::UtxoSet;

/// Current unix time in seconds, clamped at zero.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// A named, in-memory wallet.
#[derive(Clone)]
pub struct Wallet {
    name: String,
    network_id: u32,
    chain_id: Hash256,
    fee: u64,
    keychain: KeyChain,
    utxos: UtxoSet,
}

impl Wallet {
    /// Create an empty wallet with no keys and no UTXOs.
    pub fn new(name: impl Into<String>, network_id: u32, chain_id: Hash256, fee: u64) -> Self {
        Self {
            name: name.into(),
            network_id,
            chain_id,
            fee,
            keychain: KeyChain::new(),
            utxos: UtxoSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    pub fn chain_id(&self) -> Hash256 {
        self.chain_id
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// The context transactions from this wallet must verify against.
    pub fn verify_context(&self) -> VerifyContext {
        VerifyContext {
            network_id: self.network_id,
            chain_id: self.chain_id,
            fee: self.fee,
        }
    }

    pub fn keychain(&self) -> &KeyChain {
        &self.keychain
    }

    pub fn utxos(&self) -> &UtxoSet {
        &self.utxos
    }

    /// Add a spending key. Returns the address it controls.
    pub fn import_key(&mut self, keypair: KeyPair) -> ShortId {
        let id = self.keychain.import(keypair);
        debug!(wallet = %self.name, address = %id, "key imported");
        id
    }

    /// Parse a CB58 private key and import it.
    pub fn import_key_str(&mut self, encoded: &str) -> Result<ShortId, WalletError> {
        let id = self.keychain.import_cb58(encoded)?;
        debug!(wallet = %self.name, address = %id, "key imported");
        Ok(id)
    }

    /// Addresses controlled by the keychain, ascending.
    pub fn addresses(&self) -> Vec<ShortId> {
        self.keychain.short_ids().collect()
    }

    /// Insert or replace a UTXO. Ownership is checked at spend time, not here.
    pub fn add_utxo(&mut self, utxo: Utxo) -> bool {
        self.utxos.add(utxo)
    }

    /// Merge UTXOs, returning the number of new or changed entries.
    pub fn merge_utxos<I: IntoIterator<Item = Utxo>>(&mut self, utxos: I) -> usize {
        let added = self.utxos.merge(utxos);
        debug!(wallet = %self.name, added, total = self.utxos.len(), "utxos merged");
        added
    }

    /// Sum of all held UTXO amounts.
    pub fn balance(&self) -> u64 {
        self.utxos.total_amount()
    }

    /// Sum of UTXO amounts the keychain can spend at `now`.
    pub fn spendable_balance(&self, now: u64) -> u64 {
        CoinSelector::spendable_total(&self.utxos, &self.keychain, now)
    }

    /// Build, sign and verify a spend of `amount` to `destinations`.
    ///
    /// `lock_time` and `threshold` apply to the destination output. The
    /// defaults for a plain payment are `0` and `1`.
    pub fn build_transaction(
        &self,
        amount: u64,
        destinations: &[ShortId],
        lock_time: u64,
        threshold: u32,
    ) -> Result<Transaction, WalletError> {
        self.build_transaction_at(amount, destinations, lock_time, threshold, unix_now())
    }

    /// [`build_transaction`](Self::build_transaction) with an explicit clock.
    pub fn build_transaction_at(
        &self,
        amount: u64,
        destinations: &[ShortId],
        lock_time: u64,
        threshold: u32,
        now: u64,
    ) -> Result<Transaction, WalletError> {
        let destination = Destination::new(destinations, amount)
            .with_lock_time(lock_time)
            .with_threshold(threshold);
        let unsigned = TransactionBuilder::new(self.network_id, self.chain_id)
            .set_fee(self.fee)
            .build(&destination, &self.utxos, &self.keychain, now)?;
        let spent = unsigned.selection.selected.clone();
        let tx = TransactionBuilder::sign(unsigned, &self.keychain)?;

        let ctx = self.verify_context();
        verify_transaction(&tx, &ctx)?;
        verify_exact_fee(&tx, &ctx)?;
        verify_spends(&tx, &spent)?;

        info!(
            wallet = %self.name,
            amount,
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            "transaction built"
        );
        Ok(tx)
    }

    /// Forget the inputs of a transaction that will not be accepted.
    pub fn remove_utxos_for_tx(&mut self, tx: &Transaction) -> usize {
        let removed = self.utxos.remove_inputs(tx);
        debug!(wallet = %self.name, removed, "inputs removed");
        removed
    }

    /// Mark the inputs of an issued transaction as spent.
    pub fn spend_utxos_for_tx(&mut self, tx: &Transaction) -> usize {
        let removed = self.utxos.apply_spend(tx);
        debug!(wallet = %self.name, removed, "inputs spent");
        removed
    }

    /// UTXO ids held here but absent or different in `other`.
    pub fn diff(&self, other: &Wallet) -> BTreeSet<UtxoId> {
        self.utxos.diff(&other.utxos)
    }

    /// Write the UTXO set as JSON to `path`, creating parent directories.
    pub fn export_utxos(&self, path: &Path) -> Result<(), WalletError> {
        let json = self.utxos.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WalletError::Io(e.to_string()))?;
        }
        std::fs::write(path, json).map_err(|e| WalletError::Io(e.to_string()))?;
        info!(wallet = %self.name, path = %path.display(), utxos = self.utxos.len(), "utxos exported");
        Ok(())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("network_id", &self.network_id)
            .field("chain_id", &self.chain_id.to_string())
            .field("fee", &self.fee)
            .field("keys", &self.keychain.len())
            .field("utxos", &self.utxos.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dag_core::types::TxOutput;
    use proptest::prelude::*;

    const CHAIN: Hash256 = Hash256([0x11; 32]);

    fn funded(amounts: &[u64]) -> (Wallet, ShortId) {
        let mut w = Wallet::new("w1", 5, CHAIN, 1);
        let me = w.import_key(KeyPair::from_secret_bytes([1; 32]));
        for (i, amount) in amounts.iter().enumerate() {
            w.add_utxo(Utxo {
                tx_id: Hash256([i as u8 + 1; 32]),
                output_index: 0,
                output: TxOutput {
                    amount: *amount,
                    lock_time: 0,
                    threshold: 1,
                    addresses: vec![me],
                },
            });
        }
        (w, me)
    }

    #[test]
    fn spend_with_change() {
        let (w, me) = funded(&[100, 50]);
        let x = ShortId([0xAB; 20]);
        let tx = w.build_transaction_at(120, &[x], 0, 1, 0).unwrap();

        assert_eq!(tx.total_input_amount(), Some(150));
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].amount, 120);
        assert_eq!(tx.outputs[0].addresses, vec![x]);
        assert_eq!(tx.outputs[1].amount, 29);
        assert_eq!(tx.outputs[1].addresses, vec![me]);
        verify_transaction(&tx, &w.verify_context()).unwrap();
        verify_exact_fee(&tx, &w.verify_context()).unwrap();
    }

    #[test]
    fn build_does_not_mutate_wallet() {
        let (w, _) = funded(&[100, 50]);
        let before = w.utxos().clone();
        w.build_transaction_at(10, &[ShortId([1; 20])], 0, 1, 0).unwrap();
        assert_eq!(w.utxos(), &before);
    }

    #[test]
    fn spend_then_remove_inputs() {
        let (mut w, _) = funded(&[100, 50, 7]);
        let tx = w.build_transaction_at(120, &[ShortId([1; 20])], 0, 1, 0).unwrap();
        let spent = tx.inputs.len();
        assert_eq!(w.spend_utxos_for_tx(&tx), spent);
        assert_eq!(w.utxos().len(), 3 - spent);
        assert_eq!(w.remove_utxos_for_tx(&tx), 0);
    }

    #[test]
    fn insufficient_funds_when_fee_uncovered() {
        let (w, _) = funded(&[100, 50]);
        assert_eq!(
            w.build_transaction_at(150, &[ShortId([1; 20])], 0, 1, 0),
            Err(WalletError::InsufficientFunds { have: 150, need: 151 })
        );
    }

    #[test]
    fn amount_just_over_balance_minus_fee_is_insufficient() {
        let (w, _) = funded(&[100]);
        let over = w.balance() - w.fee() + 1;
        assert_eq!(
            w.build_transaction_at(over, &[ShortId([1; 20])], 0, 1, 0),
            Err(WalletError::InsufficientFunds { have: 100, need: 101 })
        );
        assert_eq!(
            w.build_transaction_at(u64::MAX, &[ShortId([1; 20])], 0, 1, 0),
            Err(WalletError::InsufficientFunds { have: 100, need: u64::MAX })
        );
    }

    #[test]
    fn spends_utxo_with_unsorted_owner_list() {
        let mut w = Wallet::new("w1", 5, CHAIN, 1);
        let me = w.import_key(KeyPair::from_secret_bytes([1; 32]));
        w.add_utxo(Utxo {
            tx_id: Hash256([1; 32]),
            output_index: 0,
            output: TxOutput {
                amount: 100,
                lock_time: 0,
                threshold: 1,
                addresses: vec![ShortId([0xFE; 20]), ShortId([0xFD; 20]), me],
            },
        });
        assert_eq!(w.spendable_balance(0), 100);
        let tx = w.build_transaction_at(10, &[ShortId([7; 20])], 0, 1, 0).unwrap();
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs[1].amount, 89);
    }

    #[test]
    fn multisig_destination_output() {
        let (w, _) = funded(&[100]);
        let (a, b) = (ShortId([2; 20]), ShortId([1; 20]));
        let tx = w.build_transaction_at(10, &[a, b], 500, 2, 0).unwrap();
        assert_eq!(tx.outputs[0].addresses, vec![b, a]);
        assert_eq!(tx.outputs[0].threshold, 2);
        assert_eq!(tx.outputs[0].lock_time, 500);
    }

    #[test]
    fn import_key_str_rejects_garbage() {
        let mut w = Wallet::new("w", 1, CHAIN, 0);
        assert!(matches!(w.import_key_str("garbage!"), Err(WalletError::KeyImport(_))));
        assert!(w.addresses().is_empty());
    }

    #[test]
    fn export_writes_json_under_new_directory() {
        let (w, _) = funded(&[100, 50]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("w1.json");
        w.export_utxos(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(UtxoSet::from_json(&text).unwrap(), *w.utxos());
    }

    #[test]
    fn diff_between_wallets() {
        let (w1, _) = funded(&[100, 50]);
        let mut w2 = Wallet::new("w2", 5, CHAIN, 1);
        let (first_id, first) = w1.utxos().iter().next().map(|(id, u)| (*id, u.clone())).unwrap();
        w2.add_utxo(first);
        let d = w1.diff(&w2);
        assert_eq!(d.len(), 1);
        assert!(!d.contains(&first_id));
    }

    #[test]
    fn debug_omits_keys() {
        let (w, _) = funded(&[1]);
        let s = format!("{w:?}");
        assert!(s.contains("keys: 1"));
        assert!(s.contains("utxos: 1"));
    }

    proptest! {
        #[test]
        fn built_tx_conserves_value(
            amounts in proptest::collection::vec(1u64..10_000, 1..8),
            amount in prop_oneof![1u64..40_000, Just(u64::MAX), Just(u64::MAX - 1)],
        ) {
            let (w, _) = funded(&amounts);
            let balance = w.balance();
            match w.build_transaction_at(amount, &[ShortId([7; 20])], 0, 1, 0) {
                Ok(tx) => {
                    let inputs = tx.total_input_amount().unwrap();
                    let outputs = tx.total_output_amount().unwrap();
                    prop_assert_eq!(inputs, outputs + w.fee());
                }
                Err(e) => {
                    prop_assert!(amount.saturating_add(w.fee()) > balance);
                    prop_assert!(
                        matches!(e, WalletError::InsufficientFunds { .. }),
                        "unexpected error: {:?}", e
                    );
                }
            }
        }
    }
}
