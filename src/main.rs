//! Trustify CLI entry point
//!
//! Drives the upload orchestrator interactively and exposes the read-only
//! surfaces (verify, list, export).

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trustify::chain::{
    ChainDescriptor, HttpWallet, ProvenanceContract, WalletProvider, SEPOLIA_CHAIN_ID,
};
use trustify::config::{AppConfig, ChainConfig, PinningConfig};
use trustify::orchestrator::{
    verify_cid, FileSelection, SwitchOutcome, UploadOrchestrator, UploadOutcome,
    VerificationOutcome,
};
use trustify::report;
use trustify::storage::{pinata::PinataProvider, StorageProvider};

#[derive(Parser)]
#[command(name = "trustify", version, about = "Document provenance over IPFS and Ethereum")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// Pinning service API base
    #[arg(long, env = "PINATA_API_BASE", default_value = "https://api.pinata.cloud")]
    pinata_api_base: String,

    #[arg(long, env = "PINATA_API_KEY", default_value = "")]
    pinata_api_key: String,

    #[arg(long, env = "PINATA_API_SECRET", default_value = "")]
    pinata_api_secret: String,

    /// Bearer token for the v3 listing API
    #[arg(long, env = "PINATA_JWT", default_value = "")]
    pinata_jwt: String,

    /// Dedicated gateway base for content links
    #[arg(long, env = "PINATA_GATEWAY")]
    pinata_gateway: Option<String>,

    /// JSON-RPC endpoint of the wallet provider
    #[arg(long, env = "WALLET_RPC_URL", default_value = "http://127.0.0.1:8545")]
    wallet_rpc_url: String,

    /// Read-only JSON-RPC endpoint
    #[arg(long, env = "READ_RPC_URL", default_value = "http://127.0.0.1:8545")]
    read_rpc_url: String,

    /// Deployed provenance contract address
    #[arg(long, env = "CONTRACT_ADDRESS")]
    contract_address: String,

    /// Chain the wallet is expected to be on
    #[arg(long, env = "EXPECTED_CHAIN_ID", default_value_t = SEPOLIA_CHAIN_ID)]
    expected_chain_id: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Pin a file and record its CID on the provenance contract
    Upload { file: PathBuf },
    /// Verify a CID against the contract
    Verify { cid: String },
    /// List previously pinned files
    List {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Export the file listing as CSV
    Export {
        out: PathBuf,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Show the connected wallet account and chain
    Account,
    /// Revoke the wallet's account permissions (logout)
    Disconnect,
}

impl ConfigArgs {
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let expected_chain = ChainDescriptor::known(self.expected_chain_id)
            .with_context(|| format!("unknown chain id {}", self.expected_chain_id))?;
        let config = AppConfig {
            pinning: PinningConfig {
                api_base: self.pinata_api_base,
                api_key: self.pinata_api_key,
                api_secret: self.pinata_api_secret,
                jwt: self.pinata_jwt,
                gateway_base: self.pinata_gateway,
            },
            chain: ChainConfig {
                wallet_rpc_url: self.wallet_rpc_url,
                read_rpc_url: self.read_rpc_url,
                contract_address: self.contract_address,
                expected_chain,
            },
            http_timeout: None,
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let command = cli.command;
    let config = cli.config.into_config()?;

    info!("Starting Trustify v{}", env!("CARGO_PKG_VERSION"));

    let mut http = reqwest::Client::builder();
    if let Some(timeout) = config.http_timeout {
        http = http.timeout(timeout);
    }
    let http = http.build().context("building HTTP client")?;

    let storage = Arc::new(PinataProvider::with_client(
        config.pinning.clone(),
        http.clone(),
    ));
    let wallet = Arc::new(HttpWallet::with_client(
        config.chain.wallet_rpc_url.clone(),
        http.clone(),
    ));
    let contract = Arc::new(
        ProvenanceContract::new(
            wallet.clone(),
            config.chain.read_rpc_url.clone(),
            config.chain.contract_address.clone(),
        )
        .with_http_client(http),
    );

    match command {
        Command::Upload { file } => {
            run_upload(storage, wallet, contract, config.chain.expected_chain, file).await
        }
        Command::Verify { cid } => {
            let outcome = verify_cid(contract.as_ref(), &cid).await?;
            println!("{}", outcome.status_line());
            if let VerificationOutcome::Found { .. } = outcome {
                if let Some(url) = storage.gateway_url(cid.trim()) {
                    println!("Preview: {url}");
                }
            }
            Ok(())
        }
        Command::List { limit, offset } => {
            let files = storage.list(limit, offset).await?;
            if files.is_empty() {
                println!("No uploaded files found.");
            } else {
                println!("{}", report::render_table(&files));
            }
            Ok(())
        }
        Command::Export { out, limit } => {
            let files = storage.list(limit, 0).await?;
            let writer = std::fs::File::create(&out)
                .with_context(|| format!("cannot create {}", out.display()))?;
            report::write_csv(&files, writer)?;
            println!("Wrote {} rows to {}", files.len(), out.display());
            Ok(())
        }
        Command::Account => {
            let accounts = wallet.request_accounts().await?;
            match accounts.first() {
                Some(account) => println!("Wallet: {account}"),
                None => println!("Wallet: disconnected"),
            }
            let chain = wallet.chain_id().await?;
            println!("Chain: {chain}");
            Ok(())
        }
        Command::Disconnect => {
            wallet.revoke_permissions().await?;
            println!("Wallet disconnected.");
            Ok(())
        }
    }
}

async fn run_upload(
    storage: Arc<PinataProvider>,
    wallet: Arc<HttpWallet>,
    contract: Arc<ProvenanceContract<HttpWallet>>,
    expected_chain: ChainDescriptor,
    file: PathBuf,
) -> anyhow::Result<()> {
    let data = tokio::fs::read(&file)
        .await
        .with_context(|| format!("cannot read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let selection = FileSelection { name, data };

    let orchestrator = UploadOrchestrator::new(storage, wallet, contract, expected_chain);

    let mut outcome = orchestrator.begin_upload(Some(selection.clone())).await;
    loop {
        match outcome {
            UploadOutcome::Stored { cid, tx_hash } => {
                println!("Document stored with CID: {cid}");
                println!("Transaction: {tx_hash}");
                return Ok(());
            }
            UploadOutcome::Failed { .. } | UploadOutcome::Superseded => {
                anyhow::bail!(orchestrator.phase().await.status_line());
            }
            UploadOutcome::SwitchRequired { cid, target } => {
                println!(
                    "Wallet is on the wrong network; expected {} (chain {}).",
                    target.chain_name, target.chain_id
                );
                if !prompt_yes_no("Switch network and resume? [y/N] ")? {
                    orchestrator.cancel_switch().await;
                    println!("Upload cancelled.");
                    return Ok(());
                }
                match orchestrator.switch_and_resume().await {
                    SwitchOutcome::Resumed { cid, tx_hash } => {
                        println!("Document stored with CID: {cid}");
                        println!("Transaction: {tx_hash}");
                        return Ok(());
                    }
                    SwitchOutcome::ResumeFailed { .. } => {
                        anyhow::bail!(orchestrator.phase().await.status_line());
                    }
                    SwitchOutcome::ChainAdded { cid } => {
                        println!("Network added to wallet; retained CID {cid}.");
                        // Re-trigger: the paused attempt reuses the retained CID.
                        outcome = orchestrator.begin_upload(Some(selection.clone())).await;
                    }
                    SwitchOutcome::SwitchError { message } => {
                        eprintln!("{message}");
                        // The attempt stays in AwaitingSwitch; prompt again.
                        outcome = UploadOutcome::SwitchRequired { cid, target };
                    }
                    SwitchOutcome::NotAwaitingSwitch | SwitchOutcome::Superseded => {
                        anyhow::bail!("upload attempt was superseded");
                    }
                }
            }
        }
    }
}

fn prompt_yes_no(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
