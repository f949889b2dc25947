//! Shell configuration loaded from environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dag_sync::SyncConfig;
use dag_sync::config::{DEFAULT_ASSET_ID, DEFAULT_CHAIN_ALIAS, DEFAULT_REQUEST_TIMEOUT};

#[derive(Clone, Debug)]
pub struct ShellConfig {
    /// Root directory for UTXO exports.
    pub data_dir: PathBuf,
    /// Upper bound on each RPC call.
    pub rpc_timeout: Duration,
    /// Chain alias used in RPC paths and rendered addresses.
    pub chain_alias: String,
    /// Asset queried by `balance`.
    pub asset_id: String,
    /// Initial node directory, name → base URL.
    pub nodes: BTreeMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_timeout: DEFAULT_REQUEST_TIMEOUT,
            chain_alias: DEFAULT_CHAIN_ALIAS.to_string(),
            asset_id: DEFAULT_ASSET_ID.to_string(),
            nodes: BTreeMap::new(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let data_dir = lookup("DAG_SHELL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let rpc_timeout = match lookup("DAG_SHELL_RPC_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v
                    .parse()
                    .context("DAG_SHELL_RPC_TIMEOUT_SECS must be a positive integer")?;
                if secs == 0 {
                    bail!("DAG_SHELL_RPC_TIMEOUT_SECS must be a positive integer");
                }
                Duration::from_secs(secs)
            }
            None => defaults.rpc_timeout,
        };

        let chain_alias = lookup("DAG_SHELL_CHAIN_ALIAS").unwrap_or(defaults.chain_alias);
        let asset_id = lookup("DAG_SHELL_ASSET_ID").unwrap_or(defaults.asset_id);

        let nodes = match lookup("DAG_SHELL_NODES") {
            Some(v) => parse_nodes(&v).context("DAG_SHELL_NODES must be name=url,name=url")?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            data_dir,
            rpc_timeout,
            chain_alias,
            asset_id,
            nodes,
        })
    }

    /// Client configuration for a node at `endpoint`.
    pub fn sync_config(&self, endpoint: &str) -> SyncConfig {
        SyncConfig::new(endpoint)
            .with_chain_alias(self.chain_alias.as_str())
            .with_asset_id(self.asset_id.as_str())
            .with_request_timeout(self.rpc_timeout)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dagshell")
}

/// Parse `name=url,name=url`. Empty entries are skipped.
pub fn parse_nodes(s: &str) -> Result<BTreeMap<String, String>> {
    let mut nodes = BTreeMap::new();
    for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, url) = entry
            .split_once('=')
            .with_context(|| format!("missing '=' in {entry:?}"))?;
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() || url.is_empty() {
            bail!("empty node name or url in {entry:?}");
        }
        nodes.insert(name.to_string(), url.to_string());
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ShellConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.rpc_timeout, Duration::from_secs(30));
        assert_eq!(cfg.chain_alias, "X");
        assert_eq!(cfg.asset_id, "AVAX");
        assert!(cfg.nodes.is_empty());
        assert!(cfg.data_dir.ends_with("dagshell"));
    }

    #[test]
    fn overrides_from_lookup() {
        let cfg = ShellConfig::from_lookup(lookup(&[
            ("DAG_SHELL_DATA_DIR", "/tmp/dag"),
            ("DAG_SHELL_RPC_TIMEOUT_SECS", "5"),
            ("DAG_SHELL_CHAIN_ALIAS", "avm"),
            ("DAG_SHELL_NODES", "n1=http://a:9650, n2=http://b:9650"),
        ]))
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/dag"));
        assert_eq!(cfg.rpc_timeout, Duration::from_secs(5));
        assert_eq!(cfg.nodes["n2"], "http://b:9650");

        let sync = cfg.sync_config("http://a:9650");
        assert_eq!(sync.rpc_url(), "http://a:9650/ext/bc/avm");
        assert_eq!(sync.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        assert!(ShellConfig::from_lookup(lookup(&[("DAG_SHELL_RPC_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ShellConfig::from_lookup(lookup(&[("DAG_SHELL_RPC_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn parse_nodes_rejects_missing_equals() {
        assert!(parse_nodes("n1").is_err());
        assert!(parse_nodes("=http://a").is_err());
        assert_eq!(parse_nodes(" , ").unwrap().len(), 0);
    }
}
