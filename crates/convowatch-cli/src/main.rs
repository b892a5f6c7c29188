//! convowatch - one-shot convocation portal check.
//!
//! Loads credentials from the environment, runs the full check pipeline
//! once, and delivers the report over Telegram. This is the subprocess
//! `convowatchd` launches per trigger; it also works standalone from a
//! scheduler.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use convowatch_core::{
    config_failure_report, format_report, pipeline, Credentials, Report, TelegramConfig,
    TelegramNotifier, WatchConfig,
};

#[derive(Parser)]
#[command(name = "convowatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convocation portal status watcher", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full check pass and send the report
    Check,
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

    match cli.command {
        Commands::Check => cmd_check().await,
    }
}

async fn cmd_check() -> Result<()> {
    // Without Telegram credentials there is no notification channel at
    // all, so nothing useful can come from running the pipeline.
    let telegram = TelegramConfig::from_env()
        .context("Telegram credentials are not configured")?;

    match Credentials::from_env() {
        Ok(credentials) => {
            let config = WatchConfig::assemble(credentials, telegram, &|key| {
                std::env::var(key).ok()
            });
            let outcome = pipeline::run(&config).await;
            print_summary(&outcome.report);
            Ok(())
        }
        Err(e) => {
            // Fail fast before any browser work, but still tell the
            // operator what is missing.
            let report = config_failure_report(&e);
            let text = format_report(&report);
            TelegramNotifier::new(telegram).deliver(&report, &text).await;
            print_summary(&report);
            Err(e).context("configuration incomplete")
        }
    }
}

fn print_summary(report: &Report) {
    println!("{:=<60}", "");
    println!("CHECK SUMMARY");
    for result in &report.results {
        println!("{}: {}", result.roll_number, result.category.label());
    }
    println!("{:=<60}", "");
}
