//! dag-shell: interactive wallet shell for DAG ledger nodes.
//!
//! Reads one command per line from stdin. Wallets, variables and node
//! names live for the duration of the session. Type `help` for the
//! command list.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod commands;
mod config;
mod vars;

use commands::{Outcome, Shell, parse_line};
use config::ShellConfig;

#[derive(Parser)]
#[command(name = "dag-shell", version, about = "Interactive wallet shell for DAG ledger nodes")]
struct Cli {
    /// Directory UTXO exports are written under.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Per-request RPC timeout in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    rpc_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ShellConfig::from_env().context("Failed to load shell configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(secs) = cli.rpc_timeout {
        config.rpc_timeout = Duration::from_secs(secs);
    }

    info!(
        data_dir = %config.data_dir.display(),
        timeout_secs = config.rpc_timeout.as_secs(),
        chain = %config.chain_alias,
        nodes = config.nodes.len(),
        "Starting dag-shell"
    );

    let mut shell = Shell::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt();
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(line) = line else { break };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprint!("{e}");
                continue;
            }
        };

        let result = tokio::select! {
            result = shell.execute(command) => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("command interrupted");
                continue;
            }
        };
        match result {
            Ok(Outcome::Output(out)) if out.is_empty() => {}
            Ok(Outcome::Output(out)) => println!("{out}"),
            Ok(Outcome::Exit) => break,
            Err(e) => eprintln!("error: {e:#}"),
        }
    }

    info!("dag-shell exiting");
    Ok(())
}

fn prompt() {
    print!("dag> ");
    let _ = std::io::stdout().flush();
}
