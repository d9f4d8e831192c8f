//! `wax-broadcast` command line.
//!
//! ```text
//! wax-broadcast [--config FILE] [--endpoint URL]... probe
//! wax-broadcast ... transfer --to NAME --quantity "1.00000000 WAX" [--memo TEXT]
//! wax-broadcast ... push --contract NAME --action NAME --data JSON
//! ```
//!
//! The signing key is read from the environment variable named by
//! `account.private_key_env` (default `WAX_PRIVATE_KEY`).

use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use wax_broadcast::chain::{Action, K1Signer, Name};
use wax_broadcast::config::{load_config_with_endpoints, BroadcasterConfig};
use wax_broadcast::observability::logging::init_logging;
use wax_broadcast::{Broadcaster, ChainRpc, HttpEndpoint};

#[derive(Parser)]
#[command(name = "wax-broadcast")]
#[command(about = "Broadcast WAX transactions through several endpoints", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint URL, in failover order (replaces configured endpoints)
    #[arg(short, long = "endpoint")]
    endpoints: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the head block of every endpoint
    Probe,
    /// Transfer tokens from the configured account
    Transfer {
        #[arg(long)]
        to: String,
        /// Amount with symbol, e.g. "0.01000000 WAX"
        #[arg(long)]
        quantity: String,
        #[arg(long, default_value = "")]
        memo: String,
        #[arg(long, default_value = "eosio.token")]
        contract: String,
    },
    /// Push an arbitrary action authorized by the configured account
    Push {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        action: String,
        /// Action arguments as JSON
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config_with_endpoints(cli.config.as_deref(), &cli.endpoints)?;

    init_logging(&config.observability);

    tracing::info!(
        endpoints = config.resolved_endpoints().len(),
        account = %config.account.name,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Probe => probe(&config).await,
        Commands::Transfer {
            to,
            quantity,
            memo,
            contract,
        } => {
            let from = config.account.name.clone();
            let data = json!({ "from": from, "to": to, "quantity": quantity, "memo": memo });
            send(&config, &contract, "transfer", data).await
        }
        Commands::Push {
            contract,
            action,
            data,
        } => {
            let data: Value = serde_json::from_str(&data)?;
            send(&config, &contract, &action, data).await
        }
    }
}

async fn probe(config: &BroadcasterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(config.rpc.request_timeout_secs);
    let endpoints: Vec<HttpEndpoint> = config
        .resolved_endpoints()
        .into_iter()
        .map(|url| HttpEndpoint::new(url).with_request_timeout(timeout))
        .collect();

    let results = join_all(endpoints.iter().map(|e| e.get_info())).await;
    for (endpoint, result) in endpoints.iter().zip(results) {
        match result {
            Ok(info) => println!(
                "{:<40} head={} chain_id={}",
                endpoint.url(),
                info.head_block_num,
                info.chain_id
            ),
            Err(e) => println!("{:<40} error: {}", endpoint.url(), e),
        }
    }
    Ok(())
}

async fn send(
    config: &BroadcasterConfig,
    contract: &str,
    action: &str,
    data: Value,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.account.name.is_empty() {
        return Err("account.name must be configured to send transactions".into());
    }

    let signer = K1Signer::from_env(&config.account.private_key_env)?;
    let authorization = config.account.permission_level()?;
    let action = Action::new(
        contract.parse::<Name>()?,
        action.parse::<Name>()?,
        vec![authorization],
        data,
    );

    let broadcaster = Broadcaster::from_config(config, Arc::new(signer), Some(reqwest::Client::new()));
    let confirmation = broadcaster.transact(vec![action]).await?;

    eprintln!("Confirmed by {}", confirmation.endpoint);
    println!("{}", serde_json::to_string_pretty(&confirmation.response)?);
    Ok(())
}
