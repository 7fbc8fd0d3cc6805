//! Page fetching: the trait seam the run loop sees, plus the reqwest-backed
//! implementation.
//!
//! Transport errors are collapsed into coarse classes before they reach a
//! signature — a timeout at 08:00 and a timeout at 09:00 must dedup to the
//! same problem, which raw error text would not.

use std::time::Duration;

use thiserror::Error;

/// A fetched document: final HTTP status plus raw body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level fetch failure. Non-success HTTP statuses are *not*
/// errors; they come back as a `FetchedPage` and policy lives in the run
/// loop.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("cannot connect to {url}: {detail}")]
    Connect { url: String, detail: String },

    #[error("request to {url} failed: {detail}")]
    Request { url: String, detail: String },
}

impl FetchError {
    /// Coarse class embedded in problem signatures. Must stay stable across
    /// runs or transport failures stop deduplicating.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connect { .. } => "connect",
            Self::Request { .. } => "request",
        }
    }
}

/// Fetch seam: given a URL, return the raw page or a transport error.
pub trait PageFetcher {
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// reqwest-backed fetcher with a per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("canarywatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, &e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, &e))?;
        Ok(FetchedPage { status, body })
    }
}

fn classify(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            detail: err.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        let page = |status| FetchedPage {
            status,
            body: String::new(),
        };
        assert!(page(200).is_success());
        assert!(page(204).is_success());
        assert!(!page(301).is_success());
        assert!(!page(404).is_success());
        assert!(!page(503).is_success());
    }

    #[test]
    fn error_kinds_are_stable() {
        let url = "https://example.com".to_string();
        assert_eq!(FetchError::Timeout { url: url.clone() }.kind(), "timeout");
        assert_eq!(
            FetchError::Connect {
                url: url.clone(),
                detail: "refused".into()
            }
            .kind(),
            "connect"
        );
        assert_eq!(
            FetchError::Request {
                url,
                detail: "body".into()
            }
            .kind(),
            "request"
        );
    }
}
