//! `canarywatch daemon` — cron in-process: one full monitoring session per
//! tick until ctrl-c or SIGTERM.

use std::path::Path;

use tokio::time::{Duration, MissedTickBehavior, interval};

use canarywatch_core::config::MonitorConfig;

use crate::cli::DaemonOpts;
use crate::cmd_check;

pub async fn run_daemon(config_path: &Path, opts: DaemonOpts) -> anyhow::Result<()> {
    let config = MonitorConfig::load(config_path)?;
    tracing::info!(
        monitor = %config.monitor_name,
        interval_secs = opts.interval_secs,
        pages = config.pages.len(),
        "daemon starting"
    );

    let mut ticker = interval(Duration::from_secs(opts.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A failed pass (journal write, mail relay) is logged and the
                // next tick tries again; the daemon itself stays up.
                if let Err(e) = cmd_check::run_session(&config, false).await {
                    tracing::error!("monitoring pass failed: {e:#}");
                }
            }
            () = shutdown_signal() => {
                tracing::info!("shutting down");
                return Ok(());
            }
        }
    }
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("received ctrl-c"),
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("received ctrl-c");
    }
}
