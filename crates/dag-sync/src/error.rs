//! Sync error types.

use dag_core::error::CodecError;
use dag_wallet::WalletError;
use thiserror::Error;

/// Errors from talking to a node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport failure or timeout; the node may not have seen the request.
    #[error("network: {0}")]
    Network(String),

    /// The node answered with a JSON-RPC error object.
    #[error("remote error {code}: {message}")]
    Remote { code: i32, message: String },

    /// The result did not match the expected schema.
    #[error("response decode: {0}")]
    ResponseDecode(String),

    /// Request parameters could not be serialized.
    #[error("request encode: {0}")]
    RequestEncode(String),

    /// Local payload could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Wallet-side failure.
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl From<jsonrpsee::core::client::Error> for SyncError {
    fn from(err: jsonrpsee::core::client::Error) -> Self {
        use jsonrpsee::core::client::Error;
        match err {
            Error::Call(obj) => SyncError::Remote {
                code: obj.code(),
                message: obj.message().to_string(),
            },
            Error::ParseError(e) => SyncError::ResponseDecode(e.to_string()),
            other => SyncError::Network(other.to_string()),
        }
    }
}
