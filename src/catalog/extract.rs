//! Item extraction from raw page content
//!
//! A catalog page arrives either as plain JSON (direct HTTP session) or as
//! browser page source, where the JSON body is rendered inside an HTML
//! `<pre>` shell. Extraction strips the shell if present, parses the JSON,
//! and pulls out the record list plus the paging metadata the crawler needs
//! to advance.
//!
//! Extraction is a pure function of the page content: fetching the same
//! page twice yields items with the same identifiers.

use crate::catalog::{CrawlItem, PageLocator};
use scraper::{Html, Selector};
use thiserror::Error;

/// Errors produced while extracting items from a page body
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("empty page body")]
    EmptyBody,

    #[error("page source contains no JSON payload")]
    NoJsonPayload,

    #[error("failed to parse page JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed record set: {0}")]
    MalformedRecords(String),
}

/// Everything extracted from one successful page fetch
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// The records on this page, in catalog order
    pub items: Vec<CrawlItem>,

    /// Server-issued token for the next page, if the catalog uses cursors
    pub next_cursor: Option<String>,

    /// Total result count reported by the catalog, if present
    pub total_count: Option<u64>,
}

/// Extracts catalog records from a raw page body
///
/// # Arguments
///
/// * `body` - Raw page content (JSON, or browser page source wrapping JSON)
/// * `source` - The locator the body was fetched from, recorded on each item
///
/// # Returns
///
/// * `Ok(ExtractedPage)` - Parsed records and paging metadata. An empty
///   `items` list is a valid result and signals the end of the sequence.
/// * `Err(ExtractError)` - The body held no parsable record set.
pub fn extract_items(body: &str, source: &PageLocator) -> Result<ExtractedPage, ExtractError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyBody);
    }

    let json_text = if trimmed.starts_with('<') {
        strip_document_shell(trimmed).ok_or(ExtractError::NoJsonPayload)?
    } else {
        trimmed.to_string()
    };

    let root: serde_json::Value = serde_json::from_str(&json_text)?;

    let results = root
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ExtractError::MalformedRecords("missing 'results' array".to_string()))?;

    let mut items = Vec::with_capacity(results.len());
    for record in results {
        let raw_id = record
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExtractError::MalformedRecords("record without an 'id'".to_string()))?;

        items.push(CrawlItem {
            id: normalize_record_id(raw_id),
            payload: record.clone(),
            source: source.clone(),
        });
    }

    let meta = root.get("meta");
    let next_cursor = meta
        .and_then(|m| m.get("next_cursor"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let total_count = meta.and_then(|m| m.get("count")).and_then(|v| v.as_u64());

    Ok(ExtractedPage {
        items,
        next_cursor,
        total_count,
    })
}

/// Pulls the text of the first `<pre>` element out of browser page source
///
/// Browsers render a JSON endpoint as an HTML document with the payload in
/// a `<pre>` block; a page without one is an interstitial or error page.
fn strip_document_shell(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("pre").ok()?;
    let pre = document.select(&selector).next()?;
    let text: String = pre.text().collect();
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Normalizes a catalog record identifier to its short form
///
/// OpenAlex ids are full URLs ("https://openalex.org/W2741809807"); the
/// short trailing segment is stable and unique across the catalog.
fn normalize_record_id(raw: &str) -> String {
    raw.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(raw)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body(ids: &[&str], next_cursor: Option<&str>) -> String {
        let results: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": format!("https://openalex.org/{}", id),
                    "title": format!("Work {}", id),
                })
            })
            .collect();
        serde_json::json!({
            "meta": { "count": 42, "next_cursor": next_cursor },
            "results": results,
        })
        .to_string()
    }

    #[test]
    fn test_extract_plain_json() {
        let body = sample_body(&["W1", "W2"], Some("tok"));
        let page = extract_items(&body, &PageLocator::first_page()).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "W1");
        assert_eq!(page.items[1].id, "W2");
        assert_eq!(page.next_cursor.as_deref(), Some("tok"));
        assert_eq!(page.total_count, Some(42));
    }

    #[test]
    fn test_extract_browser_wrapped_json() {
        let inner = sample_body(&["W7"], None);
        let body = format!(
            "<html><head></head><body><pre style=\"word-wrap: break-word;\">{}</pre></body></html>",
            inner
        );
        let page = extract_items(&body, &PageLocator::first_page()).unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "W7");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let body = sample_body(&["W1", "W2", "W3"], Some("tok"));
        let locator = PageLocator::Offset { page: 2 };

        let first = extract_items(&body, &locator).unwrap();
        let second = extract_items(&body, &locator).unwrap();

        let ids = |page: &ExtractedPage| -> Vec<String> {
            page.items.iter().map(|i| i.id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_extract_empty_results_is_ok() {
        let body = sample_body(&[], None);
        let page = extract_items(&body, &PageLocator::first_page()).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_empty_body_errors() {
        let result = extract_items("   ", &PageLocator::first_page());
        assert!(matches!(result, Err(ExtractError::EmptyBody)));
    }

    #[test]
    fn test_interstitial_page_has_no_payload() {
        let body = "<html><body><p>Checking your browser before accessing...</p></body></html>";
        let result = extract_items(body, &PageLocator::first_page());
        assert!(matches!(result, Err(ExtractError::NoJsonPayload)));
    }

    #[test]
    fn test_record_without_id_is_malformed() {
        let body = serde_json::json!({
            "meta": { "count": 1 },
            "results": [{ "title": "no id here" }],
        })
        .to_string();
        let result = extract_items(&body, &PageLocator::first_page());
        assert!(matches!(result, Err(ExtractError::MalformedRecords(_))));
    }

    #[test]
    fn test_missing_results_is_malformed() {
        let body = r#"{"meta": {"count": 0}}"#;
        let result = extract_items(body, &PageLocator::first_page());
        assert!(matches!(result, Err(ExtractError::MalformedRecords(_))));
    }

    #[test]
    fn test_normalize_record_id() {
        assert_eq!(normalize_record_id("https://openalex.org/W123"), "W123");
        assert_eq!(normalize_record_id("W123"), "W123");
        assert_eq!(normalize_record_id("https://openalex.org/W123/"), "https://openalex.org/W123/");
    }
}
