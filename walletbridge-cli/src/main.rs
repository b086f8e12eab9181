//! Command-line harness for walletbridge signer adapters.
//!
//! # Usage
//!
//! ```bash
//! # List the configured chains
//! walletbridge chains
//!
//! # Send 0.01 ETH on Base through the configured backend
//! walletbridge send --to 0x... --value 10000000000000000 --chain-id 8453
//!
//! # Issue an EIP-1193 request against the private-key connector
//! walletbridge request eth_chainId
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `walletbridge.toml`)
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::path::PathBuf;

use alloy_primitives::{Address, Bytes, U256};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use walletbridge::{ChainId, ChainRegistry, SignerAdapter, TransactionRequest};

use walletbridge_cli::backend::{ConfiguredSigner, connect_private_key, explorer_tx_url};
use walletbridge_cli::config::{Backend, WalletConfig};

/// Drive a wallet backend through the signer adapter surface.
#[derive(Parser, Debug)]
#[command(name = "walletbridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "CONFIG", default_value = "walletbridge.toml")]
    config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the configured chains, default first
    Chains,

    /// Print the connected account
    Address,

    /// Send a transaction, switching chains and retrying once on a mismatch
    Send {
        /// Recipient or contract address
        #[arg(long)]
        to: Address,

        /// Amount of native currency in wei (decimal or 0x-hex)
        #[arg(long, default_value = "0")]
        value: U256,

        /// Calldata (0x-hex)
        #[arg(long)]
        data: Option<Bytes>,

        /// Gas limit
        #[arg(long)]
        gas_limit: Option<u64>,

        /// Target chain ID
        #[arg(long)]
        chain_id: Option<ChainId>,
    },

    /// Issue an EIP-1193 request against the private-key connector
    Request {
        /// JSON-RPC method name
        method: String,

        /// Parameters as a JSON array
        #[arg(default_value = "[]")]
        params: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!("walletbridge failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = WalletConfig::load_from(&args.config)?;
    let chains = config.registry()?;
    tracing::debug!(
        backend = ?config.backend,
        chains = chains.len(),
        "Loaded configuration"
    );

    match args.command {
        Command::Chains => print_chains(&chains),
        Command::Address => {
            let signer = ConfiguredSigner::from_config(&config, chains).await?;
            output(&signer.address()?.to_string());
        }
        Command::Send {
            to,
            value,
            data,
            gas_limit,
            chain_id,
        } => {
            let mut request = TransactionRequest::new(to).with_value(value);
            if let Some(data) = data {
                request = request.with_data(data);
            }
            if let Some(gas_limit) = gas_limit {
                request = request.with_gas_limit(gas_limit);
            }
            if let Some(chain_id) = chain_id {
                request = request.with_chain_id(chain_id);
            }

            let signer = ConfiguredSigner::from_config(&config, chains).await?;
            tracing::info!(from = %signer.address()?, to = %request.to, chain_id = ?request.chain_id, "Sending transaction");
            let tx_hash = match signer.send_transaction(&request).await {
                Ok(tx_hash) => tx_hash,
                Err(e) => {
                    tracing::error!(kind = %e.kind(), "Transaction failed");
                    return Err(e.into());
                }
            };
            output(&tx_hash.to_string());
            if let Some(link) = signer
                .block_explorer_url()
                .and_then(|explorer| explorer_tx_url(explorer, &tx_hash))
            {
                output(link.as_str());
            }
        }
        Command::Request { method, params } => {
            if config.backend != Backend::LocalKey {
                return Err("request is only available with the local-key backend".into());
            }
            let params: Vec<serde_json::Value> = serde_json::from_str(&params)?;
            let connector = connect_private_key(&config, chains).await?;
            let result = connector.request(&method, &params).await?;
            output(&serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn print_chains(chains: &ChainRegistry) {
    for chain in chains.iter() {
        let rpc = chain.rpc_url.as_ref().map_or("-", |url| url.as_str());
        output(&format!("{}\t{}\t{}", chain.id, chain.name, rpc));
    }
}

#[allow(clippy::print_stdout)]
fn output(line: &str) {
    println!("{line}");
}
