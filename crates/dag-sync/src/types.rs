//! Request parameter keys and response schemas for the node's wallet API.
//!
//! Requests use named parameters with capitalized keys. Responses are
//! decoded into fixed structs; each field accepts both the camel-case
//! spelling the node documents and the capitalized one older nodes emit.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

pub const METHOD_ISSUE_TX: &str = "issueTx";
pub const METHOD_GET_TX_STATUS: &str = "getTxStatus";
pub const METHOD_GET_BALANCE: &str = "getBalance";
pub const METHOD_GET_UTXOS: &str = "getUTXOs";

pub const PARAM_TX: &str = "Tx";
pub const PARAM_TX_ID: &str = "TxID";
pub const PARAM_ADDRESS: &str = "Address";
pub const PARAM_ASSET_ID: &str = "AssetID";
pub const PARAM_ADDRESSES: &str = "Addresses";

/// `issueTx` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTxReply {
    #[serde(rename = "txID", alias = "TxID")]
    pub tx_id: String,
}

/// `getTxStatus` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTxStatusReply {
    #[serde(alias = "Status")]
    pub status: String,
}

/// `getBalance` result. The balance is a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBalanceReply {
    #[serde(alias = "Balance")]
    pub balance: String,
}

impl GetBalanceReply {
    pub fn amount(&self) -> Result<u64, SyncError> {
        self.balance
            .trim()
            .parse()
            .map_err(|e| SyncError::ResponseDecode(format!("balance {:?}: {e}", self.balance)))
    }
}

/// `getUTXOs` result: CB58-encoded UTXOs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUtxosReply {
    #[serde(alias = "UTXOs")]
    pub utxos: Vec<String>,
}

/// Decode a raw JSON result into a fixed reply schema.
pub fn decode_reply<T: for<'de> Deserialize<'de>>(
    method: &str,
    value: serde_json::Value,
) -> Result<T, SyncError> {
    serde_json::from_value(value).map_err(|e| SyncError::ResponseDecode(format!("{method}: {e}")))
}
