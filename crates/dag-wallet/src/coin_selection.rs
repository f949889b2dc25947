//! Deterministic coin selection.
//!
//! UTXOs are visited in ascending [`UtxoId`](dag_core::types::UtxoId)
//! order and accumulated until they cover the target plus fee. A UTXO is
//! only a candidate if its lock time has passed and the keychain holds
//! enough of its owning keys to meet its threshold.

use dag_core::types::Utxo;

use crate::error::WalletError;
use crate::keys::KeyChain;
use crate::utxo_set::UtxoSet;

/// Result of coin selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    /// Selected UTXOs, ascending by id.
    pub selected: Vec<Utxo>,
    /// Sum of selected amounts.
    pub total: u64,
    /// Fee deducted from the selection.
    pub fee: u64,
    /// `total - target - fee`.
    pub change: u64,
}

/// Greedy selector in id order.
pub struct CoinSelector;

impl CoinSelector {
    /// Whether `keychain` can spend `utxo` at unix time `now`.
    pub fn is_spendable(utxo: &Utxo, keychain: &KeyChain, now: u64) -> bool {
        let output = &utxo.output;
        let needed = output.threshold as usize;
        output.is_unlocked(now)
            && needed > 0
            && keychain.signers_for(&output.addresses, needed).len() >= needed
    }

    /// Sum of amounts `keychain` can spend at `now`, saturating.
    pub fn spendable_total(utxos: &UtxoSet, keychain: &KeyChain, now: u64) -> u64 {
        utxos
            .iter()
            .filter(|(_, u)| Self::is_spendable(u, keychain, now))
            .fold(0u64, |acc, (_, u)| acc.saturating_add(u.amount()))
    }

    /// Select UTXOs covering `target + fee`.
    ///
    /// # Errors
    /// - `InvalidAmount` if `target` is zero
    /// - `InsufficientFunds` if the spendable UTXOs do not cover it, including
    ///   when `target + fee` does not fit in a `u64`
    pub fn select(
        utxos: &UtxoSet,
        keychain: &KeyChain,
        target: u64,
        fee: u64,
        now: u64,
    ) -> Result<CoinSelection, WalletError> {
        if target == 0 {
            return Err(WalletError::InvalidAmount("amount must be non-zero".into()));
        }
        let Some(needed) = target.checked_add(fee) else {
            return Err(WalletError::InsufficientFunds {
                have: Self::spendable_total(utxos, keychain, now),
                need: u64::MAX,
            });
        };

        let mut selected = Vec::new();
        let mut total: u64 = 0;
        for (_, utxo) in utxos.iter() {
            if !Self::is_spendable(utxo, keychain, now) {
                continue;
            }
            selected.push(utxo.clone());
            total = total.saturating_add(utxo.amount());
            if total >= needed {
                return Ok(CoinSelection {
                    selected,
                    total,
                    fee,
                    change: total - needed,
                });
            }
        }

        Err(WalletError::InsufficientFunds { have: total, need: needed })
    }
}
