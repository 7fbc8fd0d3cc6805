//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "canarywatch", about = "warrant-canary page monitor")]
pub struct Cli {
    /// Path to the monitor config (TOML)
    #[arg(long, short = 'c', global = true, default_value = "canarywatch.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one monitoring pass and notify on new problems (the default)
    Check(CheckOpts),
    /// Run monitoring passes on an interval until interrupted
    Daemon(DaemonOpts),
    /// Print the live suppression journal (post-prune) as JSON
    Journal,
}

#[derive(clap::Args, Default)]
pub struct CheckOpts {
    /// Evaluate pages without touching the journal or sending mail
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct DaemonOpts {
    /// Seconds between monitoring passes (must be at least 1)
    #[arg(long, default_value = "3600", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,
}
