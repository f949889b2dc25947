//! JSON-RPC client for one node.
//!
//! Results are requested as raw JSON and decoded into the fixed schemas in
//! [`types`](crate::types), so a schema mismatch is reported as
//! `ResponseDecode` with the method name rather than as a transport error.
//! No wallet lock is held while a request is in flight.

use std::collections::BTreeSet;

use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use dag_core::address::Address;
use dag_core::codec;
use dag_core::types::{Hash256, ShortId, Transaction, UtxoId};
use dag_wallet::SharedWallet;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::refresh::{self, RefreshReport};
use crate::types::{
    GetBalanceReply, GetTxStatusReply, GetUtxosReply, IssueTxReply, METHOD_GET_BALANCE,
    METHOD_GET_TX_STATUS, METHOD_GET_UTXOS, METHOD_ISSUE_TX, PARAM_ADDRESS, PARAM_ADDRESSES,
    PARAM_ASSET_ID, PARAM_TX, PARAM_TX_ID, decode_reply,
};

/// Client bound to a single node endpoint.
#[derive(Clone)]
pub struct SyncClient {
    config: SyncConfig,
    client: HttpClient,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("url", &self.config.rpc_url())
            .field("timeout", &self.config.request_timeout)
            .finish()
    }
}

impl SyncClient {
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let client = HttpClientBuilder::default()
            .request_timeout(config.request_timeout)
            .build(config.rpc_url())
            .map_err(|e| SyncError::Network(format!("{}: {e}", config.rpc_url())))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    async fn call<T: DeserializeOwned>(
        &self,
        name: &str,
        params: ObjectParams,
    ) -> Result<T, SyncError> {
        let method = self.config.method(name);
        debug!(%method, url = %self.config.rpc_url(), "rpc request");
        let value: serde_json::Value = self.client.request(&method, params).await?;
        decode_reply(&method, value)
    }

    /// Fetch the CB58 UTXOs the node holds for `addresses`.
    pub async fn fetch_utxos(&self, addresses: &[ShortId]) -> Result<Vec<String>, SyncError> {
        let addresses: Vec<String> = addresses
            .iter()
            .map(|id| Address::new(self.config.chain_alias.as_str(), *id).to_string())
            .collect();
        let params = object_params(&[(PARAM_ADDRESSES, &addresses)])?;
        let reply: GetUtxosReply = self.call(METHOD_GET_UTXOS, params).await?;
        Ok(reply.utxos)
    }

    /// Pull UTXOs for every address of `wallet` and merge them.
    ///
    /// Addresses and held UTXO ids are read under the wallet lock, the
    /// request runs unlocked, and the merge takes the lock once more. A UTXO
    /// spent or removed while the request was in flight stays gone.
    pub async fn refresh(&self, wallet: &SharedWallet) -> Result<RefreshReport, SyncError> {
        let (addresses, held) = {
            let w = wallet.lock();
            let held: BTreeSet<UtxoId> = w.utxos().iter().map(|(id, _)| *id).collect();
            (w.addresses(), held)
        };
        let encoded = self.fetch_utxos(&addresses).await?;
        Ok(refresh::apply_since(wallet, &encoded, &held))
    }

    /// Issue a signed transaction. Returns the id the node assigned.
    pub async fn submit(&self, tx: &Transaction) -> Result<Hash256, SyncError> {
        let encoded = codec::tx_to_cb58(tx)?;
        self.submit_encoded(&encoded).await
    }

    /// Issue a transaction already encoded as CB58.
    pub async fn submit_encoded(&self, encoded: &str) -> Result<Hash256, SyncError> {
        let params = object_params(&[(PARAM_TX, encoded)])?;
        let reply: IssueTxReply = self.call(METHOD_ISSUE_TX, params).await?;
        let tx_id = reply
            .tx_id
            .parse::<Hash256>()
            .map_err(|e| SyncError::ResponseDecode(format!("txID {:?}: {e}", reply.tx_id)))?;
        info!(%tx_id, "transaction issued");
        Ok(tx_id)
    }

    /// Status string for `tx_id`, as reported by the node.
    pub async fn status(&self, tx_id: &Hash256) -> Result<String, SyncError> {
        let params = object_params(&[(PARAM_TX_ID, tx_id.to_string())])?;
        let reply: GetTxStatusReply = self.call(METHOD_GET_TX_STATUS, params).await?;
        Ok(reply.status)
    }

    /// Balance of the configured asset held by `address`.
    pub async fn balance(&self, address: &ShortId) -> Result<u64, SyncError> {
        let address = Address::new(self.config.chain_alias.as_str(), *address).to_string();
        let params = object_params(&[
            (PARAM_ADDRESS, address),
            (PARAM_ASSET_ID, self.config.asset_id.clone()),
        ])?;
        let reply: GetBalanceReply = self.call(METHOD_GET_BALANCE, params).await?;
        reply.amount()
    }
}

fn object_params<V: Serialize>(entries: &[(&str, V)]) -> Result<ObjectParams, SyncError> {
    let mut params = ObjectParams::new();
    for (key, value) in entries {
        params
            .insert(key, value)
            .map_err(|e| SyncError::RequestEncode(e.to_string()))?;
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_builds_for_valid_url() {
        let client = SyncClient::new(SyncConfig::new("http://127.0.0.1:9650")).unwrap();
        assert_eq!(client.config().rpc_url(), "http://127.0.0.1:9650/ext/bc/X");
    }

    #[tokio::test]
    async fn invalid_url_is_network_error() {
        let err = SyncClient::new(SyncConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[test]
    fn object_params_builds_named_map() {
        let params = object_params(&[(PARAM_TX, "abc")]).unwrap();
        let raw = jsonrpsee::core::traits::ToRpcParams::to_rpc_params(params)
            .unwrap()
            .unwrap();
        assert_eq!(raw.get(), r#"{"Tx":"abc"}"#);
    }
}
