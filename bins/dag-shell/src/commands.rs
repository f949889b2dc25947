//! Shell commands and their execution against the wallet registry.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use dag_core::address::Address;
use dag_core::codec;
use dag_core::crypto::KeyPair;
use dag_core::types::{Hash256, Transaction, UtxoId};
use dag_sync::SyncClient;
use dag_wallet::keys::export_secret;
use dag_wallet::{SharedWallet, WalletError, WalletRegistry};

use crate::config::ShellConfig;
use crate::vars::VarStore;

/// One line of shell input.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create an empty wallet.
    Create {
        name: String,
        network_id: u32,
        /// Chain id, CB58.
        chain_id: String,
        fee: u64,
        /// Overwrite an existing wallet of the same name.
        #[arg(long)]
        replace: bool,
    },
    /// Generate a random private key and print it.
    Newkey,
    /// Import a private key into a wallet.
    Addkey { wallet: String, key: String },
    /// Build and sign a transaction; print it CB58-encoded.
    Maketx {
        wallet: String,
        /// Destination address(es), comma separated.
        destinations: String,
        amount: u64,
        /// Unix time before which the payment cannot be spent.
        #[arg(long, default_value_t = 0)]
        lock_time: u64,
        /// Destination keys required to spend the payment.
        #[arg(long, default_value_t = 1)]
        threshold: u32,
    },
    /// Drop the inputs of a transaction from a wallet.
    Remove { wallet: String, tx: String },
    /// Mark the inputs of a transaction as spent.
    Spend { wallet: String, tx: String },
    /// Issue a transaction through a node.
    Send { node: String, tx: String },
    /// Query a transaction's status on a node.
    Status { node: String, tx_id: String },
    /// Query an address balance on a node.
    Balance { node: String, address: String },
    /// Pull a wallet's UTXOs from a node.
    Refresh { node: String, wallet: String },
    /// Export a wallet's UTXO set as JSON under the data directory.
    Writeutxo { wallet: String, file: PathBuf },
    /// Store the UTXO ids in wallet A but not in wallet B as a variable.
    Compare {
        wallet_a: String,
        wallet_b: String,
        scope: String,
        var: String,
    },
    /// Create a variable scope.
    Varscope { scope: String },
    /// Print a variable.
    Getvar { scope: String, var: String },
    /// List the variables in a scope.
    Vars { scope: String },
    /// Register a node endpoint.
    Node { name: String, url: String },
    /// List registered nodes.
    Nodes,
    /// List wallets.
    Wallets,
    /// Leave the shell.
    Exit,
}

/// What the REPL should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Exit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, clap::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    ShellLine::try_parse_from(line.split_whitespace()).map(|l| Some(l.command))
}

/// Session state: wallets, variables and known nodes.
pub struct Shell {
    config: ShellConfig,
    wallets: WalletRegistry,
    vars: VarStore,
    nodes: BTreeMap<String, String>,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Self {
        let nodes = config.nodes.clone();
        Self {
            config,
            wallets: WalletRegistry::new(),
            vars: VarStore::new(),
            nodes,
        }
    }

    pub fn wallets(&self) -> &WalletRegistry {
        &self.wallets
    }

    fn address(&self, text: &str) -> Result<Address> {
        Address::parse(text).map_err(|e| WalletError::InvalidAddress(format!("{text}: {e}")).into())
    }

    fn render(&self, address: &Address) -> String {
        Address::new(self.config.chain_alias.as_str(), address.short_id()).to_string()
    }

    fn client(&self, node: &str) -> Result<SyncClient> {
        let url = self
            .nodes
            .get(node)
            .with_context(|| format!("node not found: {node}"))?;
        Ok(SyncClient::new(self.config.sync_config(url))?)
    }

    fn export_path(&self, file: &Path) -> Result<PathBuf> {
        let escapes = file
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file.as_os_str().is_empty() || escapes {
            bail!("export path must be relative to the data directory: {}", file.display());
        }
        Ok(self.config.data_dir.join(file))
    }

    pub async fn execute(&mut self, command: Command) -> Result<Outcome> {
        let out = match command {
            Command::Create {
                name,
                network_id,
                chain_id,
                fee,
                replace,
            } => {
                let chain_id: Hash256 = chain_id
                    .parse()
                    .with_context(|| format!("invalid chain id: {chain_id}"))?;
                if replace {
                    self.wallets.replace(&name, network_id, chain_id, fee);
                } else {
                    self.wallets.create(&name, network_id, chain_id, fee)?;
                }
                format!("created wallet {name}")
            }
            Command::Newkey => {
                let keypair = KeyPair::generate();
                let address = Address::new(self.config.chain_alias.as_str(), keypair.short_id());
                format!("{}\naddress: {address}", export_secret(&keypair))
            }
            Command::Addkey { wallet, key } => {
                let wallet = self.wallets.get(&wallet)?;
                let id = wallet.lock().import_key_str(&key)?;
                Address::new(self.config.chain_alias.as_str(), id).to_string()
            }
            Command::Maketx {
                wallet,
                destinations,
                amount,
                lock_time,
                threshold,
            } => {
                let destinations = destinations
                    .split(',')
                    .filter(|d| !d.is_empty())
                    .map(|d| self.address(d).map(|a| a.short_id()))
                    .collect::<Result<Vec<_>>>()?;
                let wallet = self.wallets.get(&wallet)?;
                let tx = wallet
                    .lock()
                    .build_transaction(amount, &destinations, lock_time, threshold)?;
                codec::tx_to_cb58(&tx)?
            }
            Command::Remove { wallet, tx } => {
                let tx = decode_tx(&tx)?;
                let removed = self.wallets.get(&wallet)?.lock().remove_utxos_for_tx(&tx);
                format!("removed {removed} utxo(s)")
            }
            Command::Spend { wallet, tx } => {
                let tx = decode_tx(&tx)?;
                let spent = self.wallets.get(&wallet)?.lock().spend_utxos_for_tx(&tx);
                format!("spent {spent} utxo(s)")
            }
            Command::Send { node, tx } => {
                let tx_id = self.client(&node)?.submit_encoded(&tx).await?;
                format!("TxID: {tx_id}")
            }
            Command::Status { node, tx_id } => {
                let tx_id: Hash256 = tx_id
                    .parse()
                    .with_context(|| format!("invalid tx id: {tx_id}"))?;
                let status = self.client(&node)?.status(&tx_id).await?;
                format!("Status: {status}")
            }
            Command::Balance { node, address } => {
                let address = self.address(&address)?;
                let balance = self.client(&node)?.balance(&address.short_id()).await?;
                format!("Balance of {}: {balance}", self.render(&address))
            }
            Command::Refresh { node, wallet } => {
                let client = self.client(&node)?;
                let wallet = self.wallets.get(&wallet)?;
                let report = client.refresh(&wallet).await?;
                let mut out = format!(
                    "received {}, added {}, stale {}, failed {}",
                    report.received,
                    report.added,
                    report.stale,
                    report.failures.len()
                );
                for failure in &report.failures {
                    out.push_str(&format!("\n  #{}: {}", failure.index, failure.reason));
                }
                out
            }
            Command::Writeutxo { wallet, file } => {
                let path = self.export_path(&file)?;
                self.wallets.get(&wallet)?.lock().export_utxos(&path)?;
                format!("wrote {}", path.display())
            }
            Command::Compare {
                wallet_a,
                wallet_b,
                scope,
                var,
            } => {
                let a = self.wallets.get(&wallet_a)?;
                let b = self.wallets.get(&wallet_b)?;
                let diff = diff_wallets(&a, &b);
                let ids: Vec<String> = diff.iter().map(ToString::to_string).collect();
                let json = serde_json::to_string(&ids)?;
                self.vars.set(&scope, &var, json)?;
                info!(%wallet_a, %wallet_b, differing = ids.len(), "wallets compared");
                format!("{} utxo(s) in {wallet_a} not in {wallet_b}", ids.len())
            }
            Command::Varscope { scope } => {
                if self.vars.create_scope(&scope) {
                    format!("created scope {scope}")
                } else {
                    format!("scope {scope} exists")
                }
            }
            Command::Getvar { scope, var } => self.vars.get(&scope, &var)?.to_string(),
            Command::Vars { scope } => self.vars.names(&scope)?.join("\n"),
            Command::Node { name, url } => {
                let replaced = self.nodes.insert(name.clone(), url.clone()).is_some();
                if replaced {
                    format!("node {name} now at {url}")
                } else {
                    format!("node {name} at {url}")
                }
            }
            Command::Nodes => self
                .nodes
                .iter()
                .map(|(name, url)| format!("{name}\t{url}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Wallets => self
                .wallets
                .names()
                .into_iter()
                .filter_map(|name| {
                    let wallet = self.wallets.get(&name).ok()?;
                    let w = wallet.lock();
                    Some(format!(
                        "{name}\tnetwork {}\tkeys {}\tutxos {}\tbalance {}",
                        w.network_id(),
                        w.keychain().len(),
                        w.utxos().len(),
                        w.balance()
                    ))
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Exit => return Ok(Outcome::Exit),
        };
        Ok(Outcome::Output(out))
    }
}

/// UTXO ids in `a` but absent or different in `b`.
///
/// `b`'s set is copied out before `a` is locked, so the two wallet locks are
/// never held together.
fn diff_wallets(a: &SharedWallet, b: &SharedWallet) -> BTreeSet<UtxoId> {
    let theirs = b.lock().utxos().clone();
    a.lock().utxos().diff(&theirs)
}

fn decode_tx(encoded: &str) -> Result<Transaction, WalletError> {
    codec::tx_from_cb58(encoded).map_err(WalletError::TxDecode)
}
