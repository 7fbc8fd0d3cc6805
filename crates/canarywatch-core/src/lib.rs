//! canarywatch-core: problem signatures, the deduplicating TTL journal,
//! and the monitor configuration model.
//!
//! Pure library — no network, no async. The fetch/evaluate/notify side
//! lives in `canarywatch-monitor`.

pub mod config;
pub mod journal;
pub mod signature;

pub use config::MonitorConfig;
pub use journal::{FileJournal, Journal, JournalError, MemoryJournal, PutOutcome};
pub use signature::Signature;
