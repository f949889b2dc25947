//! Client configuration.

use std::time::Duration;

/// Node endpoint used when none is given.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9650";

/// Chain alias in the RPC path, `/ext/bc/<alias>`.
pub const DEFAULT_CHAIN_ALIAS: &str = "X";

/// Method namespace, `<namespace>.<method>`.
pub const DEFAULT_NAMESPACE: &str = "avm";

/// Asset queried by `getBalance`.
pub const DEFAULT_ASSET_ID: &str = "AVAX";

/// Upper bound on a single RPC round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the node, e.g. `http://127.0.0.1:9650`.
    pub endpoint: String,
    pub chain_alias: String,
    pub namespace: String,
    pub asset_id: String,
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl SyncConfig {
    /// Defaults for everything but the endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            chain_alias: DEFAULT_CHAIN_ALIAS.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            asset_id: DEFAULT_ASSET_ID.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_chain_alias(mut self, alias: impl Into<String>) -> Self {
        self.chain_alias = alias.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_asset_id(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = asset_id.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full JSON-RPC URL: `<endpoint>/ext/bc/<chain alias>`.
    pub fn rpc_url(&self) -> String {
        format!(
            "{}/ext/bc/{}",
            self.endpoint.trim_end_matches('/'),
            self.chain_alias
        )
    }

    /// Qualified method name, e.g. `avm.getUTXOs`.
    pub fn method(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.rpc_url(), "http://127.0.0.1:9650/ext/bc/X");
        assert_eq!(cfg.method("issueTx"), "avm.issueTx");
        assert_eq!(cfg.asset_id, "AVAX");
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let cfg = SyncConfig::new("http://node:9650/").with_chain_alias("avm");
        assert_eq!(cfg.rpc_url(), "http://node:9650/ext/bc/avm");
    }

    #[test]
    fn setters_override() {
        let cfg = SyncConfig::new("http://n")
            .with_namespace("xvm")
            .with_asset_id("TEST")
            .with_request_timeout(Duration::from_millis(250));
        assert_eq!(cfg.method("getBalance"), "xvm.getBalance");
        assert_eq!(cfg.asset_id, "TEST");
        assert_eq!(cfg.request_timeout, Duration::from_millis(250));
    }
}
