use arc_testnet::batch::{faucet_candidates, BatchOperation, BatchReport, BatchRunner};
use arc_testnet::executor::{TransactionExecutor, TxStatus};
use arc_testnet::task::{OperationCatalog, OperationRequest};
use arc_testnet::{ArcConfig, EndpointProvider, WalletRegistry};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use core_logic::{setup_logger, BatchCounters};
use dialoguer::{theme::ColorfulTheme, Confirm};
use dotenv::dotenv;
use ethers::types::{Bytes, TxHash};
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Arc testnet wallet-pool bot", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/arc-testnet/config.toml")]
    config: String,
    /// Write a JSON snapshot of the session counters here on exit
    #[arg(short, long)]
    export_metrics: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every wallet's balance
    Balances,
    /// List underfunded wallets and where to fund them
    Faucet,
    /// Mint NFTs from every funded wallet
    Mint {
        #[arg(long, default_value_t = 1)]
        amount: u64,
    },
    /// Deploy an ERC-20 from every funded wallet (random parameters unless given)
    DeployToken {
        #[arg(long, requires_all = ["symbol", "supply"])]
        name: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        supply: Option<u64>,
    },
    /// Register one name per funded wallet, random where not given
    RegisterName { names: Vec<String> },
    /// Send native value from every funded wallet
    Transfer {
        #[arg(long)]
        to: String,
        #[arg(long)]
        value: f64,
        /// Hex payload
        #[arg(long)]
        data: Option<String>,
    },
    /// Mint, deploy a token and register a name on every funded wallet
    AutoAll {
        #[arg(long)]
        yes: bool,
    },
    /// Look up a transaction by hash
    Status { hash: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger("logs");
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = match ArcConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Ok(());
        }
    };

    let registry = WalletRegistry::load(&config.wallets_file, &config.proxies_file, config.chain_id)?;

    let endpoint = EndpointProvider::new(&config.rpc_url, config.chain_id, registry.proxies())?;
    let catalog = OperationCatalog::new(config.contracts()?);
    let executor = TransactionExecutor::new(endpoint, catalog, config.retry_config())
        .with_confirmation_timeout(config.confirmation_timeout());
    let runner = BatchRunner::new(executor)
        .with_delays(config.wallet_delay(), config.operation_delay());

    let min_balance = config.min_balance_wei()?;
    let wallets = registry.wallets();
    let started = Instant::now();
    let mut counters = BatchCounters::new();

    let operation = match args.command {
        Command::Balances => {
            let entries = runner.balance_report(wallets, min_balance).await;
            println!("{}", "Wallet balances".bold());
            for entry in &entries {
                let mark = if entry.sufficient {
                    "ok".green()
                } else {
                    "low".red()
                };
                println!(
                    "  {:<16} {:?}  {} [{}]",
                    entry.wallet, entry.address, entry.formatted, mark
                );
            }
            return Ok(());
        }
        Command::Faucet => {
            let entries = runner.balance_report(wallets, min_balance).await;
            let low = faucet_candidates(&entries);
            if low.is_empty() {
                println!("{}", "All wallets are funded.".green());
                return Ok(());
            }
            println!(
                "{} wallet(s) below {} native. Request funds at {}",
                low.len(),
                config.min_balance,
                config.faucet_url.cyan()
            );
            for entry in low {
                println!("  {:<16} {:?}", entry.wallet, entry.address);
            }
            return Ok(());
        }
        Command::Status { hash } => {
            let hash: TxHash = hash.parse().context("Invalid transaction hash")?;
            match runner.executor().lookup_status(hash).await? {
                TxStatus::Pending => println!("{}", "pending".yellow()),
                TxStatus::Confirmed {
                    block_number,
                    gas_used,
                } => println!(
                    "{} block={} gas={}",
                    "confirmed".green(),
                    block_number.map(|b| b.to_string()).unwrap_or_default(),
                    gas_used.map(|g| g.to_string()).unwrap_or_default()
                ),
                TxStatus::Failed { block_number } => println!(
                    "{} block={}",
                    "failed".red(),
                    block_number.map(|b| b.to_string()).unwrap_or_default()
                ),
                TxStatus::NotFound => println!("{}", "not found".red()),
            }
            return Ok(());
        }
        Command::AutoAll { yes } => {
            if !yes {
                let proceed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!(
                        "Run mint, token deploy and name registration on {} wallet(s)?",
                        wallets.len()
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !proceed {
                    info!("Auto-all cancelled");
                    return Ok(());
                }
            }
            let report = runner.run_auto_all(wallets, min_balance, &mut counters).await;
            print_summary(&report, &counters);
            export_metrics(args.export_metrics.as_deref(), &counters, started).await;
            return Ok(());
        }
        Command::Mint { amount } => BatchOperation::Fixed(OperationRequest::mint(amount)),
        Command::DeployToken {
            name: Some(name),
            symbol: Some(symbol),
            supply: Some(supply),
        } => BatchOperation::Fixed(OperationRequest::deploy_token(name, symbol, supply)),
        Command::DeployToken { .. } => BatchOperation::RandomToken,
        Command::RegisterName { names } if names.is_empty() => BatchOperation::RandomName,
        Command::RegisterName { names } => BatchOperation::Names(names),
        Command::Transfer { to, value, data } => {
            let data = match data {
                Some(raw) => {
                    let hex_part = raw.trim().trim_start_matches("0x");
                    Some(Bytes::from(
                        hex::decode(hex_part).context("--data is not valid hex")?,
                    ))
                }
                None => None,
            };
            BatchOperation::Fixed(OperationRequest::transfer(to, value, data))
        }
    };

    let report = runner
        .run_batch(wallets, min_balance, &operation, &mut counters)
        .await;
    print_summary(&report, &counters);
    export_metrics(args.export_metrics.as_deref(), &counters, started).await;

    Ok(())
}

fn print_summary(report: &BatchReport, session: &BatchCounters) {
    let batch = &report.counters;
    println!();
    println!("{}", "Batch summary".bold());
    println!(
        "  attempted {}  succeeded {}  failed {}  skipped {}",
        batch.total_attempted,
        batch.succeeded.to_string().green(),
        batch.failed.to_string().red(),
        batch.skipped.to_string().yellow()
    );
    println!(
        "  minted {}  tokens {}  names {}  transfers {}",
        session.nfts_minted, session.tokens_deployed, session.names_registered, session.transfers
    );
    println!("  success rate {:.1}%", session.success_rate());
}

async fn export_metrics(path: Option<&str>, counters: &BatchCounters, started: Instant) {
    if let Some(path) = path {
        match counters.snapshot(started).export_to_file(path).await {
            Ok(_) => info!("Metrics exported to {}", path),
            Err(e) => error!("Failed to export metrics: {}", e),
        }
    }
}
