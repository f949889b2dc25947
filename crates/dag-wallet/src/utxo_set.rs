//! The set of unspent outputs a wallet believes it can spend.
//!
//! Keyed by [`UtxoId`] in a `BTreeMap`, so iteration, export and diff
//! results all come out in ascending id order without extra sorting.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use dag_core::types::{Transaction, Utxo, UtxoId};

use crate::error::WalletError;

#[derive(Serialize)]
struct ExportRef<'a> {
    id: UtxoId,
    #[serde(flatten)]
    utxo: &'a Utxo,
}

#[derive(Deserialize)]
struct ExportRecord {
    id: UtxoId,
    #[serde(flatten)]
    utxo: Utxo,
}

/// UTXOs keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSet {
    utxos: BTreeMap<UtxoId, Utxo>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. Returns `true` if the set changed.
    pub fn add(&mut self, utxo: Utxo) -> bool {
        let id = utxo.id();
        match self.utxos.get(&id) {
            Some(existing) if *existing == utxo => false,
            _ => {
                self.utxos.insert(id, utxo);
                true
            }
        }
    }

    /// Delete by id. Absent ids are ignored.
    pub fn remove(&mut self, id: &UtxoId) -> Option<Utxo> {
        self.utxos.remove(id)
    }

    /// Remove every UTXO consumed by `tx`. Outputs are not added; they
    /// arrive through a later refresh. Returns how many were present.
    pub fn apply_spend(&mut self, tx: &Transaction) -> usize {
        tx.input_ids()
            .filter(|id| self.utxos.remove(id).is_some())
            .count()
    }

    /// Drop the inputs of a transaction the node rejected or that was
    /// abandoned. Same set effect as [`apply_spend`](Self::apply_spend).
    pub fn remove_inputs(&mut self, tx: &Transaction) -> usize {
        self.apply_spend(tx)
    }

    /// Insert every UTXO, returning the number of new or changed ids.
    pub fn merge<I: IntoIterator<Item = Utxo>>(&mut self, utxos: I) -> usize {
        utxos.into_iter().map(|u| self.add(u)).filter(|&changed| changed).count()
    }

    /// Ids held here that are missing from `other` or differ in content.
    pub fn diff(&self, other: &UtxoSet) -> BTreeSet<UtxoId> {
        self.utxos
            .iter()
            .filter(|(id, utxo)| other.utxos.get(id) != Some(*utxo))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn get(&self, id: &UtxoId) -> Option<&Utxo> {
        self.utxos.get(id)
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// UTXOs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &Utxo)> {
        self.utxos.iter()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Sum of all amounts, saturating.
    pub fn total_amount(&self) -> u64 {
        self.utxos
            .values()
            .fold(0u64, |acc, u| acc.saturating_add(u.amount()))
    }

    /// Pretty JSON array of `{ id, tx_id, output_index, output }`, sorted by id.
    pub fn to_json(&self) -> Result<String, WalletError> {
        let records: Vec<ExportRef<'_>> = self
            .utxos
            .iter()
            .map(|(id, utxo)| ExportRef { id: *id, utxo })
            .collect();
        serde_json::to_string_pretty(&records).map_err(|e| WalletError::Serialization(e.to_string()))
    }

    /// Parse a document written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        let records: Vec<ExportRecord> =
            serde_json::from_str(json).map_err(|e| WalletError::Serialization(e.to_string()))?;
        let mut set = Self::new();
        for record in records {
            if record.utxo.id() != record.id {
                return Err(WalletError::Serialization(format!(
                    "id {} does not match its record",
                    record.id
                )));
            }
            set.add(record.utxo);
        }
        Ok(set)
    }
}

impl FromIterator<Utxo> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = Utxo>>(iter: I) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}
