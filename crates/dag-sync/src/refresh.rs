//! Decoding a `getUTXOs` reply and merging it into a wallet.
//!
//! Each entry is decoded on its own; a malformed entry is reported and
//! skipped while the rest are merged. All decoded UTXOs go into the wallet
//! under one lock acquisition, so a concurrent spend on the same wallet
//! sees either none or all of them.
//!
//! A reply reflects the node at the time of the fetch. UTXOs the wallet held
//! when the fetch started but has since dropped (spent or removed while the
//! request was in flight) are not resurrected by a late merge.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use dag_core::codec;
use dag_core::types::{Utxo, UtxoId};
use dag_wallet::{SharedWallet, WalletError};

/// An entry of the node's reply that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    /// Position in the reply.
    pub index: usize,
    /// The CB58 text as received.
    pub encoded: String,
    pub reason: WalletError,
}

/// Outcome of merging one `getUTXOs` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Entries in the reply.
    pub received: usize,
    /// UTXOs that were new or changed in the wallet.
    pub added: usize,
    /// UTXOs dropped locally while the fetch was in flight, not re-added.
    pub stale: usize,
    pub failures: Vec<RefreshFailure>,
}

impl RefreshReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decode every entry, splitting successes from failures.
pub fn decode_utxos(encoded: &[String]) -> (Vec<Utxo>, Vec<RefreshFailure>) {
    let mut utxos = Vec::with_capacity(encoded.len());
    let mut failures = Vec::new();
    for (index, text) in encoded.iter().enumerate() {
        match codec::utxo_from_cb58(text) {
            Ok(utxo) => utxos.push(utxo),
            Err(e) => {
                warn!(index, error = %e, "skipping undecodable utxo");
                failures.push(RefreshFailure {
                    index,
                    encoded: text.clone(),
                    reason: WalletError::UtxoDecode(e),
                });
            }
        }
    }
    (utxos, failures)
}

/// Decode `encoded` and merge the successes into `wallet`.
pub fn apply(wallet: &SharedWallet, encoded: &[String]) -> RefreshReport {
    apply_since(wallet, encoded, &BTreeSet::new())
}

/// Like [`apply`], where `held` is the wallet's UTXO ids when the fetch
/// started. Entries in `held` that the wallet no longer has are skipped.
pub fn apply_since(
    wallet: &SharedWallet,
    encoded: &[String],
    held: &BTreeSet<UtxoId>,
) -> RefreshReport {
    let (utxos, failures) = decode_utxos(encoded);
    let mut wallet = wallet.lock();
    let (fresh, stale): (Vec<Utxo>, Vec<Utxo>) = utxos
        .into_iter()
        .partition(|u| {
            let id = u.id();
            !held.contains(&id) || wallet.utxos().contains(&id)
        });
    if !stale.is_empty() {
        debug!(wallet = %wallet.name(), stale = stale.len(), "skipping utxos dropped during fetch");
    }
    let added = wallet.merge_utxos(fresh);
    info!(
        wallet = %wallet.name(),
        received = encoded.len(),
        added,
        stale = stale.len(),
        failed = failures.len(),
        "wallet refreshed"
    );
    RefreshReport {
        received: encoded.len(),
        added,
        stale: stale.len(),
        failures,
    }
}
