//! Problem signatures: opaque string keys identifying one distinct problem
//! instance for deduplication.
//!
//! Two observations are "the same problem" iff their signatures are
//! byte-equal. The journal never inspects a signature's contents, so the
//! constructors below are the only place where signature text is shaped —
//! changing a format string here resets suppression for that problem family.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque dedup key for one observed problem instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// A monitored page answered with a non-success HTTP status.
    pub fn http_status(status: u16, url: &str) -> Self {
        Self(format!("Warning: missing page, got HTTP {status} for {url}"))
    }

    /// A fetch failed below the HTTP layer. `kind` must be a coarse, stable
    /// class ("timeout", "connect", "request") — variable error text in the
    /// signature would defeat dedup for transport failures.
    pub fn fetch_failed(kind: &str, url: &str) -> Self {
        Self(format!("Warning: failed to fetch {url} ({kind})"))
    }

    /// A structural query that is expected to match now yields nothing,
    /// usually a site redesign.
    pub fn selector_vanished(selector: &str, url: &str) -> Self {
        Self(format!(
            "Warning: page appears to be missing selector:{selector}, url:{url}"
        ))
    }

    /// The expected text is absent from a matched subtree — the canary event.
    pub fn text_missing(expected: &str, url: &str) -> Self {
        Self(format!(
            "ALERT: expected text not found: \"{expected}\", in: {url}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Signature {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Signature {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
