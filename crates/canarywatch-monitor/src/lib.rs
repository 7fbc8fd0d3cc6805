//! canarywatch-monitor: the fetch → evaluate → journal run loop and the
//! collaborator seams around it (HTTP fetcher, pattern evaluator, mailer).

pub mod evaluate;
pub mod fetch;
pub mod notify;
pub mod run;

pub use fetch::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use notify::{Notifier, NotifyError, SmtpNotifier};
pub use run::{MonitorError, run_checks};
