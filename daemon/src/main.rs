//! Quickdraw daemon — entry point for running the wager service.

use clap::Parser;
use quickdraw_chain::{HttpTreasuryClient, HttpTxVerifier, HttpWalletDirectory};
use quickdraw_engine::{EngineConfig, GameEngine, ShutdownController};
use quickdraw_messages::WebhookNotifier;
use quickdraw_rpc::RpcServer;
use quickdraw_store::{MemoryStore, MetaStore, PlayerStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "quickdraw-daemon", about = "Quickdraw wager service daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port for the HTTP API.
    #[arg(long, env = "QUICKDRAW_RPC_PORT")]
    rpc_port: Option<u16>,

    /// EVM JSON-RPC endpoint for transaction confirmation.
    #[arg(long, env = "QUICKDRAW_CHAIN_RPC_URL")]
    chain_rpc_url: Option<String>,

    /// Treasury service base URL for outbound USDC transfers.
    #[arg(long, env = "QUICKDRAW_TREASURY_URL")]
    treasury_url: Option<String>,

    /// Wallet API base URL for resolving payout addresses.
    #[arg(long, env = "QUICKDRAW_WALLET_DIRECTORY_URL")]
    wallet_directory_url: Option<String>,

    /// Webhook the chat transport listens on for outbound notifications.
    #[arg(long, env = "QUICKDRAW_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "QUICKDRAW_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "QUICKDRAW_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(&path.display().to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(port) = cli.rpc_port {
        config.rpc_port = port;
    }
    if let Some(url) = cli.chain_rpc_url {
        config.chain_rpc_url = url;
    }
    if let Some(url) = cli.treasury_url {
        config.treasury_url = url;
    }
    if let Some(url) = cli.wallet_directory_url {
        config.wallet_directory_url = url;
    }
    if let Some(url) = cli.webhook_url {
        config.webhook_url = url;
    }
    config.log_level = cli.log_level;
    if cli.log_json {
        config.log_format = "json".to_string();
    }

    quickdraw_utils::init_tracing(&config.log_level, config.log_format == "json");
    tracing::info!(
        rpc_port = config.rpc_port,
        chain_rpc = %config.chain_rpc_url,
        policy = ?config.confirm_policy,
        "starting quickdraw daemon"
    );

    let store = Arc::new(MemoryStore::new());
    let verifier = Arc::new(HttpTxVerifier::new(
        config.chain_rpc_url.clone(),
        Duration::from_millis(config.confirm_poll_ms),
        Duration::from_secs(config.confirm_timeout_secs),
    ));
    let directory = Arc::new(HttpWalletDirectory::new(config.wallet_directory_url.clone()));
    let treasury = Arc::new(HttpTreasuryClient::new(config.treasury_url.clone()));
    let notifier = Arc::new(WebhookNotifier::new(config.webhook_url.clone()));

    let players: Arc<dyn PlayerStore> = store.clone();
    let meta: Arc<dyn MetaStore> = store;
    let engine = Arc::new(GameEngine::new(
        &config,
        verifier,
        directory,
        treasury,
        notifier,
        players,
        meta,
    ));

    let shutdown = Arc::new(ShutdownController::new());
    let sweeper = engine.spawn_sweeper(config.sweep_interval_secs, &shutdown);

    let server = RpcServer::new(config.rpc_port);
    let serve_engine = Arc::clone(&engine);
    let serve_shutdown = Arc::clone(&shutdown);
    let serve_task =
        tokio::spawn(async move { server.serve(serve_engine, &serve_shutdown).await });

    shutdown.wait_for_signal().await;
    let _ = sweeper.await;
    match serve_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("rpc server exited with error: {e}"),
        Err(e) => tracing::error!("rpc server task panicked: {e}"),
    }

    tracing::info!("quickdraw daemon exited cleanly");
    Ok(())
}
