//! Run-loop behavior against a stub fetcher: problem detection, per-page
//! isolation, and suppression across sessions through the file journal.

use std::collections::HashMap;

use canarywatch_core::config::{PageConfig, PatternCheck};
use canarywatch_core::journal::{FileJournal, Journal, MemoryJournal};
use canarywatch_core::signature::Signature;
use canarywatch_monitor::fetch::{FetchError, FetchedPage, PageFetcher};
use canarywatch_monitor::run::{MonitorError, run_checks};

/// Canned responses keyed by URL; unknown URLs refuse the connection.
#[derive(Default)]
struct StubFetcher {
    responses: HashMap<String, Result<FetchedPage, FetchError>>,
}

impl StubFetcher {
    fn page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Ok(FetchedPage {
                status,
                body: body.to_string(),
            }),
        );
        self
    }

    fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }
}

impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        match self.responses.get(url) {
            Some(canned) => canned.clone(),
            None => Err(FetchError::Connect {
                url: url.to_string(),
                detail: "connection refused".to_string(),
            }),
        }
    }
}

const CANARY_URL: &str = "https://example.com/warrant-canary";

const CANARY_BODY: &str = r#"<html><body>
  <div class="container-lgc">
    <p>0   National Security
       Letters;</p>
    <p>0 Gag orders;</p>
  </div>
</body></html>"#;

fn canary_page() -> PageConfig {
    PageConfig {
        url: CANARY_URL.to_string(),
        checks: vec![
            PatternCheck {
                selector: "div.container-lgc".to_string(),
                expect: "National Security letters".to_string(),
            },
            PatternCheck {
                selector: "div.container-lgc".to_string(),
                expect: "0 Gag orders;".to_string(),
            },
        ],
    }
}

#[tokio::test]
async fn healthy_page_reports_nothing() {
    let fetcher = StubFetcher::default().page(CANARY_URL, 200, CANARY_BODY);
    let mut journal = MemoryJournal::new();

    let results = run_checks(&fetcher, &mut journal, &[canary_page()])
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn http_404_yields_exactly_one_signature() {
    let fetcher = StubFetcher::default().page(CANARY_URL, 404, "not found");
    let mut journal = MemoryJournal::new();

    let results = run_checks(&fetcher, &mut journal, &[canary_page()])
        .await
        .unwrap();
    assert_eq!(results, vec![Signature::http_status(404, CANARY_URL)]);
}

#[tokio::test]
async fn failed_fetch_skips_pattern_evaluation() {
    let fetcher = StubFetcher::default().failing(
        CANARY_URL,
        FetchError::Timeout {
            url: CANARY_URL.to_string(),
        },
    );
    let mut journal = MemoryJournal::new();

    let results = run_checks(&fetcher, &mut journal, &[canary_page()])
        .await
        .unwrap();
    // Only the fetch signature; no vanished-selector noise for a page that
    // was never parsed.
    assert_eq!(results, vec![Signature::fetch_failed("timeout", CANARY_URL)]);
}

#[tokio::test]
async fn vanished_selector_and_missing_text_are_reported() {
    let redesigned = "https://example.com/redesigned";
    let reworded = "https://example.com/reworded";
    let fetcher = StubFetcher::default()
        .page(redesigned, 200, "<html><body><p>new layout</p></body></html>")
        .page(
            reworded,
            200,
            "<html><body><div class=\"container-lgc\">We received one warrant.</div></body></html>",
        );
    let pages = vec![
        PageConfig {
            url: redesigned.to_string(),
            checks: vec![PatternCheck {
                selector: "div.container-lgc".to_string(),
                expect: "0 Warrants".to_string(),
            }],
        },
        PageConfig {
            url: reworded.to_string(),
            checks: vec![PatternCheck {
                selector: "div.container-lgc".to_string(),
                expect: "0 Warrants".to_string(),
            }],
        },
    ];

    let mut journal = MemoryJournal::new();
    let results = run_checks(&fetcher, &mut journal, &pages).await.unwrap();
    assert_eq!(
        results,
        vec![
            Signature::selector_vanished("div.container-lgc", redesigned),
            Signature::text_missing("0 Warrants", reworded),
        ]
    );
}

#[tokio::test]
async fn page_failures_are_isolated() {
    let dead = "https://example.com/dead";
    let fetcher = StubFetcher::default().page(CANARY_URL, 200, CANARY_BODY);
    let pages = vec![
        PageConfig {
            url: dead.to_string(),
            checks: vec![],
        },
        canary_page(),
    ];

    let mut journal = MemoryJournal::new();
    let results = run_checks(&fetcher, &mut journal, &pages).await.unwrap();
    // The dead page is reported and the healthy page is still evaluated.
    assert_eq!(results, vec![Signature::fetch_failed("connect", dead)]);
}

#[tokio::test]
async fn invalid_selector_fails_before_any_fetch() {
    let fetcher = StubFetcher::default();
    let pages = vec![PageConfig {
        url: CANARY_URL.to_string(),
        checks: vec![PatternCheck {
            selector: "div[".to_string(),
            expect: "x".to_string(),
        }],
    }];

    let mut journal = MemoryJournal::new();
    let err = run_checks(&fetcher, &mut journal, &pages).await.unwrap_err();
    assert!(matches!(err, MonitorError::Selector(_)));
    assert!(journal.results().is_empty());
}

#[tokio::test]
async fn second_run_within_window_is_suppressed() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("journal.json");
    let fetcher = StubFetcher::default().page(CANARY_URL, 404, "gone");
    let pages = vec![canary_page()];

    let mut first = FileJournal::open(&path, 720);
    let results = run_checks(&fetcher, &mut first, &pages).await.unwrap();
    assert_eq!(results.len(), 1);
    first.close().unwrap();

    let mut second = FileJournal::open(&path, 720);
    let results = run_checks(&fetcher, &mut second, &pages).await.unwrap();
    assert!(results.is_empty(), "same failure must not re-alert in-window");
    second.close().unwrap();
}
