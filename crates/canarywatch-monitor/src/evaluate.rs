//! Pattern evaluation: CSS selectors over fetched HTML, with the text
//! normalization the dedup contract depends on.
//!
//! Matching is deliberately mechanical: the subtree's text is flattened to
//! a single-spaced, trimmed string, then both sides are lower-cased for a
//! substring test. Nothing fuzzier — incidental markup whitespace must not
//! produce false alerts, and nothing beyond case folding may mask a real
//! change.

use canarywatch_core::config::PatternCheck;
use canarywatch_core::signature::Signature;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// An invalid selector is a configuration mistake, not a page problem.
#[derive(Debug, Error)]
#[error("invalid selector {selector:?}: {detail}")]
pub struct SelectorError {
    pub selector: String,
    pub detail: String,
}

/// A pattern check with its selector compiled.
#[derive(Debug, Clone)]
pub struct CompiledCheck {
    selector: Selector,
    selector_text: String,
    expect: String,
}

/// Compile a check's selector, keeping the original text for signatures.
pub fn compile(check: &PatternCheck) -> Result<CompiledCheck, SelectorError> {
    let selector = Selector::parse(&check.selector).map_err(|e| SelectorError {
        selector: check.selector.clone(),
        detail: e.to_string(),
    })?;
    Ok(CompiledCheck {
        selector,
        selector_text: check.selector.clone(),
        expect: check.expect.clone(),
    })
}

/// Flatten a matched subtree to a single-spaced, trimmed string. Whitespace
/// runs *inside* a text node collapse too — a wrapped source line in one
/// `<p>` must compare equal to the same sentence on one line.
pub fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive substring test between the flattened subtree text and
/// the expected text.
pub fn contains_expected(flattened: &str, expected: &str) -> bool {
    flattened.to_lowercase().contains(&expected.to_lowercase())
}

/// Evaluate one fetched document against a page's compiled checks.
///
/// Returns problem signatures only; an empty vec means the page passed. A
/// selector with zero matches yields one "vanished" signature; a match whose
/// flattened text lacks the expected string yields one "text missing"
/// signature per failing match (identical text, so the journal collapses
/// them anyway).
pub fn evaluate_document(body: &str, url: &str, checks: &[CompiledCheck]) -> Vec<Signature> {
    let document = Html::parse_document(body);
    let mut problems = Vec::new();

    for check in checks {
        let matches: Vec<ElementRef<'_>> = document.select(&check.selector).collect();
        if matches.is_empty() {
            problems.push(Signature::selector_vanished(&check.selector_text, url));
            continue;
        }
        for element in matches {
            let text = flatten_text(element);
            if !contains_expected(&text, &check.expect) {
                problems.push(Signature::text_missing(&check.expect, url));
            }
        }
    }

    problems
}
