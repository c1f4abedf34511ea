use clap::Parser;
use spendsight_script::ScriptLimits;
use spendsight_service::{build_router, ServiceConfig, ServiceState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "spendsightd", version, about = "Spendsight chat service over the spend ledger")]
struct Cli {
    /// Socket address to bind, e.g. 127.0.0.1:8095
    #[arg(long, default_value = "127.0.0.1:8095")]
    listen: SocketAddr,
    /// File the encoded transaction ledger is persisted to.
    #[arg(long, default_value = "spendsight/data/ledger.spnd")]
    store: PathBuf,
    /// Passphrase for the ledger's at-rest obfuscation.
    #[arg(long, env = "SPENDSIGHT_PASSPHRASE", default_value = "spendsight-dev")]
    passphrase: String,
    /// Directory CSV exports are written into.
    #[arg(long, default_value = "spendsight/exports")]
    export_dir: PathBuf,
    /// Wall-clock budget for one analysis script, in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    script_timeout_ms: u64,
    /// Evaluation-step budget for one analysis script.
    #[arg(long, default_value_t = 100_000)]
    script_max_steps: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "spendsight_service=info,info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig {
        store_path: cli.store,
        passphrase: cli.passphrase,
        export_dir: cli.export_dir,
        script_limits: ScriptLimits {
            max_steps: cli.script_max_steps,
            timeout: Duration::from_millis(cli.script_timeout_ms),
        },
    };

    let state = ServiceState::bootstrap(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!("spendsight-service listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
