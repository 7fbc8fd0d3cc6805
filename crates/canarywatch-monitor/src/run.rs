//! One monitoring pass: fetch every configured page, evaluate its checks,
//! feed each problem through the journal, return the newly reported
//! signatures.
//!
//! Failures are isolated per page — a dead page becomes a reportable
//! signature and the loop moves on. Nothing here retries.

use canarywatch_core::config::PageConfig;
use canarywatch_core::journal::Journal;
use canarywatch_core::signature::Signature;
use thiserror::Error;

use crate::evaluate::{self, CompiledCheck, SelectorError};
use crate::fetch::PageFetcher;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Run one pass over `pages`, in configured order.
///
/// Selectors are compiled up front: an invalid selector is a configuration
/// mistake and fails the whole pass before the first fetch, rather than
/// half-reporting.
pub async fn run_checks<F, J>(
    fetcher: &F,
    journal: &mut J,
    pages: &[PageConfig],
) -> Result<Vec<Signature>, MonitorError>
where
    F: PageFetcher,
    J: Journal,
{
    let mut plans: Vec<(&PageConfig, Vec<CompiledCheck>)> = Vec::with_capacity(pages.len());
    for page in pages {
        let compiled = page
            .checks
            .iter()
            .map(evaluate::compile)
            .collect::<Result<Vec<_>, _>>()?;
        plans.push((page, compiled));
    }

    for (page, checks) in &plans {
        tracing::debug!(url = %page.url, checks = checks.len(), "checking page");

        let fetched = match fetcher.fetch(&page.url).await {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::debug!(url = %page.url, error = %err, "fetch failed");
                journal.put(Signature::fetch_failed(err.kind(), &page.url));
                continue;
            }
        };

        if !fetched.is_success() {
            journal.put(Signature::http_status(fetched.status, &page.url));
            continue;
        }

        for problem in evaluate::evaluate_document(&fetched.body, &page.url, checks) {
            journal.put(problem);
        }
    }

    Ok(journal.results().to_vec())
}
