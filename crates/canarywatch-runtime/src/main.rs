//! canarywatch: warrant-canary page monitor binary.
//!
//! Fetches configured pages, evaluates pattern checks, and alerts operators
//! once per distinct problem per suppression window.

use clap::Parser;

mod cli;
mod cmd_check;
mod cmd_journal;
mod daemon;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("CANARYWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let command = args
        .command
        .unwrap_or_else(|| cli::Command::Check(cli::CheckOpts::default()));

    match command {
        cli::Command::Check(opts) => cmd_check::cmd_check(&args.config, opts.dry_run).await?,
        cli::Command::Daemon(opts) => daemon::run_daemon(&args.config, opts).await?,
        cli::Command::Journal => cmd_journal::cmd_journal(&args.config)?,
    }

    Ok(())
}
