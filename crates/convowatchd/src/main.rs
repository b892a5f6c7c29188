//! convowatchd - HTTP trigger daemon for the convocation checker.
//!
//! Exposes `/`, `/health`, `/check` (202, background run), and
//! `/check-sync` (inline run under a time bound). Each trigger launches
//! the `convowatch` binary as a subprocess owning its browser session
//! end-to-end.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

mod server;

use server::{build_router, AppState, RunnerConfig};

#[derive(Parser)]
#[command(name = "convowatchd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP trigger daemon for the convocation portal watcher", long_about = None)]
struct Cli {
    /// Listen port
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Checker binary launched per trigger
    #[arg(long, default_value = "convowatch")]
    checker_bin: String,

    /// Time bound for the synchronous endpoint, in seconds
    #[arg(long, default_value_t = 300)]
    sync_timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    convowatch_core::init_tracing(cli.json, level);

    let state = AppState {
        runner: Arc::new(RunnerConfig {
            command: vec![cli.checker_bin, "check".to_string()],
            timeout: Duration::from_secs(cli.sync_timeout_secs),
        }),
    };
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "convowatchd listening");
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
