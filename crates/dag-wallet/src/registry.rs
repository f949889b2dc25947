//! Name → wallet table.
//!
//! The table sits behind a `RwLock`; each wallet behind its own `Mutex`, so
//! commands on different wallets never contend and a lookup never blocks
//! on a wallet being mutated.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use dag_core::types::Hash256;

use crate::error::WalletError;
use crate::wallet::Wallet;

/// A wallet handle shared between the registry and its callers.
pub type SharedWallet = Arc<Mutex<Wallet>>;

/// Registered wallets, created explicitly and kept until process exit.
#[derive(Default)]
pub struct WalletRegistry {
    wallets: RwLock<HashMap<String, SharedWallet>>,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty wallet under `name`.
    ///
    /// Fails with `DuplicateName` if the name is taken; use
    /// [`replace`](Self::replace) to overwrite.
    pub fn create(
        &self,
        name: &str,
        network_id: u32,
        chain_id: Hash256,
        fee: u64,
    ) -> Result<SharedWallet, WalletError> {
        let mut wallets = self.wallets.write();
        if wallets.contains_key(name) {
            return Err(WalletError::DuplicateName(name.to_string()));
        }
        let wallet = Arc::new(Mutex::new(Wallet::new(name, network_id, chain_id, fee)));
        wallets.insert(name.to_string(), Arc::clone(&wallet));
        info!(wallet = %name, network_id, %chain_id, fee, "wallet created");
        Ok(wallet)
    }

    /// Register an empty wallet under `name`, discarding any previous one.
    ///
    /// Handles to the old wallet stay valid but are no longer reachable by name.
    pub fn replace(&self, name: &str, network_id: u32, chain_id: Hash256, fee: u64) -> SharedWallet {
        let wallet = Arc::new(Mutex::new(Wallet::new(name, network_id, chain_id, fee)));
        let previous = self
            .wallets
            .write()
            .insert(name.to_string(), Arc::clone(&wallet));
        info!(
            wallet = %name,
            network_id,
            %chain_id,
            fee,
            replaced = previous.is_some(),
            "wallet created"
        );
        wallet
    }

    pub fn get(&self, name: &str) -> Result<SharedWallet, WalletError> {
        self.wallets
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| WalletError::WalletNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.wallets.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.wallets.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.wallets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.read().is_empty()
    }
}

impl std::fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRegistry")
            .field("wallets", &self.names())
            .finish()
    }
}
