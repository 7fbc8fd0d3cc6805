//! Deduplicating, time-expiring notification journal.
//!
//! The journal remembers which problem signatures have already been reported
//! so that a problem observed on every run (a missing page gets probed every
//! tick) alerts operators once per suppression window instead of every pass.
//! Entries expire after the configured window, so a still-broken page is
//! eventually re-reported rather than silenced forever.
//!
//! One `FileJournal` value is one session: open loads and prunes persisted
//! state, `put` records problems, close persists pending additions exactly
//! once. Pruning happens at open only — a signature expiring mid-session
//! stays suppressed until the next session.
//!
//! Single-writer: the persisted file is shared across process invocations
//! (cron-style runs), and at most one live session per file is assumed.
//! Concurrent sessions race as last-writer-wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use crate::signature::Signature;

/// Default suppression window: 12 hours.
pub const DEFAULT_EXPIRE_MINUTES: u64 = 720;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to write journal {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize journal state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Membership result of a `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// First sighting within the suppression window; appended to results.
    NewlyReported,
    /// Already known (persisted state or earlier in this session); no-op.
    AlreadyKnown,
}

impl PutOutcome {
    pub fn is_new(self) -> bool {
        matches!(self, Self::NewlyReported)
    }
}

/// Dedup seam between the run loop and storage. `FileJournal` is the real
/// store; `MemoryJournal` backs tests and dry runs.
pub trait Journal {
    /// Submit a problem signature. Idempotent within a session.
    fn put(&mut self, signature: Signature) -> PutOutcome;

    /// Newly reported signatures so far this session, in submission order.
    fn results(&self) -> &[Signature];
}

// ─── FileJournal ────────────────────────────────────────────────────

/// File-backed journal. Persisted layout is a single JSON object mapping
/// signature text to first-seen epoch seconds.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    expire_after_secs: i64,
    /// Unexpired entries loaded from disk (post-prune).
    known: BTreeMap<String, i64>,
    /// Entries first seen this session, merged into `known` at close.
    pending: BTreeMap<String, i64>,
    session_results: Vec<Signature>,
}

impl FileJournal {
    /// Open a session against `path` with the given suppression window.
    ///
    /// Infallible by design: a missing file is an empty journal, and an
    /// unparseable file degrades to an empty journal with a loud log — a
    /// broken suppression record must never block monitoring.
    pub fn open(path: impl Into<PathBuf>, expire_after_mins: u64) -> Self {
        let path = path.into();
        let known = load_state(&path);
        let mut journal = Self {
            path,
            expire_after_secs: expire_after_mins as i64 * 60,
            known,
            pending: BTreeMap::new(),
            session_results: Vec::new(),
        };
        journal.prune(Utc::now().timestamp());
        journal
    }

    /// Entries currently suppressing re-notification: post-prune persisted
    /// state plus this session's pending additions.
    pub fn entries(&self) -> BTreeMap<String, i64> {
        let mut all = self.known.clone();
        all.extend(self.pending.iter().map(|(k, v)| (k.clone(), *v)));
        all
    }

    /// Close the session, persisting pending additions.
    ///
    /// A write failure means monitoring ran but the suppression record did
    /// not persist — the caller decides whether that deserves its own alert.
    /// Dropping without `close` still commits (best effort, error logged),
    /// but only `close` lets the caller observe the failure.
    pub fn close(mut self) -> Result<(), JournalError> {
        self.commit()
    }

    /// Keep an entry while its first-seen time plus the window is still in
    /// the future.
    fn prune(&mut self, now: i64) {
        self.known
            .retain(|_, first_seen| *first_seen + self.expire_after_secs > now);
    }

    /// Merge pending additions into the known map and persist. Skips the
    /// write entirely when nothing was added this session, leaving the file
    /// untouched. Drains `pending`, so a second call is a no-op.
    fn commit(&mut self) -> Result<(), JournalError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.known.append(&mut self.pending);
        write_state(&self.path, &self.known)
    }
}

impl Journal for FileJournal {
    fn put(&mut self, signature: Signature) -> PutOutcome {
        let key = signature.as_str();
        if self.known.contains_key(key) || self.pending.contains_key(key) {
            return PutOutcome::AlreadyKnown;
        }
        tracing::warn!(problem = %signature, "new problem reported");
        self.pending
            .insert(key.to_string(), Utc::now().timestamp());
        self.session_results.push(signature);
        PutOutcome::NewlyReported
    }

    fn results(&self) -> &[Signature] {
        &self.session_results
    }
}

impl Drop for FileJournal {
    fn drop(&mut self) {
        if let Err(e) = self.commit() {
            tracing::error!("journal write failed on drop: {e}");
        }
    }
}

// ─── MemoryJournal ──────────────────────────────────────────────────

/// In-memory journal with identical dedup semantics and no persistence.
/// Backs unit tests and `check --dry-run`.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    known: BTreeMap<String, i64>,
    session_results: Vec<Signature>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a signature as if it had been reported in an earlier session.
    pub fn seed_known(&mut self, signature: Signature, first_seen: i64) {
        self.known.insert(signature.into_string(), first_seen);
    }
}

impl Journal for MemoryJournal {
    fn put(&mut self, signature: Signature) -> PutOutcome {
        let key = signature.as_str();
        if self.known.contains_key(key) {
            return PutOutcome::AlreadyKnown;
        }
        tracing::warn!(problem = %signature, "new problem reported");
        self.known.insert(key.to_string(), Utc::now().timestamp());
        self.session_results.push(signature);
        PutOutcome::NewlyReported
    }

    fn results(&self) -> &[Signature] {
        &self.session_results
    }
}

// ─── Persistence helpers ────────────────────────────────────────────

/// Load persisted state, failing open. Timestamps are accepted as floats
/// for compatibility with stores written with fractional epoch seconds;
/// sub-second precision is dropped.
fn load_state(path: &Path) -> BTreeMap<String, i64> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::error!(
                "cannot read journal {}: {e}; starting with empty suppression history",
                path.display()
            );
            return BTreeMap::new();
        }
    };
    match serde_json::from_str::<BTreeMap<String, f64>>(&raw) {
        Ok(map) => map.into_iter().map(|(k, ts)| (k, ts as i64)).collect(),
        Err(e) => {
            tracing::error!(
                "journal {} is unparseable: {e}; suppression history reset, \
                 duplicate alerts may follow",
                path.display()
            );
            BTreeMap::new()
        }
    }
}

/// Persist the full state as one JSON object, via temp file + rename so a
/// crash mid-write cannot leave a truncated journal behind.
fn write_state(path: &Path, state: &BTreeMap<String, i64>) -> Result<(), JournalError> {
    let json = serde_json::to_string(state)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(|source| JournalError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| JournalError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
