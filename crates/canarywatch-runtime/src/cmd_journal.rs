//! `canarywatch journal` — inspect the live suppression state.

use std::path::Path;

use canarywatch_core::config::MonitorConfig;
use canarywatch_core::journal::FileJournal;

pub fn cmd_journal(config_path: &Path) -> anyhow::Result<()> {
    let config = MonitorConfig::load(config_path)?;

    // Opening prunes expired entries in memory; with no puts this session,
    // the file on disk is left untouched.
    let journal = FileJournal::open(&config.journal_path, config.expire_minutes);
    println!("{}", serde_json::to_string_pretty(&journal.entries())?);
    Ok(())
}
