//! Transaction construction and signing.
//!
//! 1. Describe the destination output (addresses, amount, lock, threshold)
//! 2. Build an unsigned transaction (performs coin selection)
//! 3. Sign every input with the keychain

use dag_core::crypto::{KeyPair, sign_input};
use dag_core::types::{Hash256, ShortId, Transaction, TxInput, TxOutput, Utxo};

use crate::coin_selection::{CoinSelection, CoinSelector};
use crate::error::WalletError;
use crate::keys::KeyChain;
use crate::utxo_set::UtxoSet;

/// The output a spend pays into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Owning addresses, sorted and unique.
    pub addresses: Vec<ShortId>,
    pub amount: u64,
    /// Unix seconds before which the output cannot be spent.
    pub lock_time: u64,
    /// Owners that must sign to spend the output.
    pub threshold: u32,
}

impl Destination {
    /// Pay `amount` to `addresses` with no lock and a 1-of-n threshold.
    pub fn new(addresses: &[ShortId], amount: u64) -> Self {
        let mut addresses = addresses.to_vec();
        addresses.sort();
        addresses.dedup();
        Self {
            addresses,
            amount,
            lock_time: 0,
            threshold: 1,
        }
    }

    pub fn with_lock_time(mut self, lock_time: u64) -> Self {
        self.lock_time = lock_time;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    fn validate(&self) -> Result<(), WalletError> {
        if self.amount == 0 {
            return Err(WalletError::InvalidAmount("amount must be non-zero".into()));
        }
        if self.threshold == 0 || self.threshold as usize > self.addresses.len() {
            return Err(WalletError::InvalidThreshold {
                threshold: self.threshold,
                addresses: self.addresses.len(),
            });
        }
        Ok(())
    }

    fn output(&self) -> TxOutput {
        TxOutput {
            amount: self.amount,
            lock_time: self.lock_time,
            threshold: self.threshold,
            addresses: self.addresses.clone(),
        }
    }
}

/// An unsigned transaction ready for signing.
#[derive(Debug)]
pub struct UnsignedTransaction {
    /// The transaction with empty credentials.
    pub tx: Transaction,
    /// The coin selection it was built from, input order.
    pub selection: CoinSelection,
}

/// Builder for one spend on a given network and chain.
///
/// # Example
/// ```ignore
/// let unsigned = TransactionBuilder::new(network_id, chain_id)
///     .set_fee(1)
///     .build(&dest, &utxos, &keychain, now)?;
/// let signed = TransactionBuilder::sign(unsigned, &keychain)?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    network_id: u32,
    chain_id: Hash256,
    fee: u64,
}

impl TransactionBuilder {
    pub fn new(network_id: u32, chain_id: Hash256) -> Self {
        Self {
            network_id,
            chain_id,
            fee: 0,
        }
    }

    /// Flat fee burned by every transaction.
    pub fn set_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Select coins and lay out inputs and outputs.
    ///
    /// Outputs are the destination followed by change, if any. Change goes
    /// to the keychain's lowest address with no lock and threshold 1.
    pub fn build(
        &self,
        destination: &Destination,
        utxos: &UtxoSet,
        keychain: &KeyChain,
        now: u64,
    ) -> Result<UnsignedTransaction, WalletError> {
        destination.validate()?;
        let selection = CoinSelector::select(utxos, keychain, destination.amount, self.fee, now)?;

        let inputs = selection
            .selected
            .iter()
            .map(|u| TxInput {
                tx_id: u.tx_id,
                output_index: u.output_index,
                amount: u.amount(),
                credentials: vec![],
            })
            .collect();

        let mut outputs = Vec::with_capacity(2);
        outputs.push(destination.output());
        if selection.change > 0 {
            let change_address = keychain
                .first()
                .ok_or_else(|| WalletError::KeyNotFound("no change address".into()))?;
            outputs.push(TxOutput {
                amount: selection.change,
                lock_time: 0,
                threshold: 1,
                addresses: vec![change_address],
            });
        }

        let tx = Transaction {
            network_id: self.network_id,
            chain_id: self.chain_id,
            inputs,
            outputs,
        };
        Ok(UnsignedTransaction { tx, selection })
    }

    /// Sign every input with the first `threshold` keychain keys among the
    /// consumed UTXO's owners, in address order.
    pub fn sign(
        unsigned: UnsignedTransaction,
        keychain: &KeyChain,
    ) -> Result<Transaction, WalletError> {
        let mut tx = unsigned.tx;
        for (i, utxo) in unsigned.selection.selected.iter().enumerate() {
            let signers = required_signers(utxo, keychain)?;
            sign_input(&mut tx, i, &signers)?;
        }
        Ok(tx)
    }
}

fn required_signers<'a>(
    utxo: &Utxo,
    keychain: &'a KeyChain,
) -> Result<Vec<&'a KeyPair>, WalletError> {
    let needed = utxo.output.threshold as usize;
    let signers = keychain.signers_for(&utxo.output.addresses, needed);
    if signers.is_empty() || signers.len() < needed {
        return Err(WalletError::KeyNotFound(format!("signers for utxo {}", utxo.id())));
    }
    Ok(signers)
}
