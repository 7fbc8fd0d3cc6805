//! `canarywatch check` — one monitoring session: open the journal, run the
//! pass, close (persisting suppression state), notify on new problems.

use std::path::Path;
use std::time::Duration;

use canarywatch_core::config::MonitorConfig;
use canarywatch_core::journal::{FileJournal, MemoryJournal};
use canarywatch_core::signature::Signature;
use canarywatch_monitor::fetch::HttpFetcher;
use canarywatch_monitor::notify::{Notifier, SmtpNotifier};
use canarywatch_monitor::run::run_checks;

pub async fn cmd_check(config_path: &Path, dry_run: bool) -> anyhow::Result<()> {
    let config = MonitorConfig::load(config_path)?;
    run_session(&config, dry_run).await
}

/// One open-run-close-notify session. Shared with the daemon loop.
pub async fn run_session(config: &MonitorConfig, dry_run: bool) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;

    let results: Vec<Signature> = if dry_run {
        let mut journal = MemoryJournal::new();
        run_checks(&fetcher, &mut journal, &config.pages).await?
    } else {
        let mut journal = FileJournal::open(&config.journal_path, config.expire_minutes);
        let results = run_checks(&fetcher, &mut journal, &config.pages).await?;
        // A failed write here means the pass ran but suppression did not
        // persist; that must reach the operator, not a log line.
        journal.close()?;
        results
    };

    if results.is_empty() {
        tracing::info!(monitor = %config.monitor_name, "no new problems");
        return Ok(());
    }
    tracing::warn!(
        monitor = %config.monitor_name,
        count = results.len(),
        "new problems this session"
    );

    if dry_run {
        return Ok(());
    }
    match &config.smtp {
        Some(smtp) => {
            let notifier = SmtpNotifier::new(smtp, smtp.password()?, &config.monitor_name)?;
            notifier.notify(&results).await?;
        }
        None => tracing::warn!("no [smtp] section in config; alerts were logged only"),
    }

    Ok(())
}
