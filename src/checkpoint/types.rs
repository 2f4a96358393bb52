use crate::catalog::PageLocator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Version tag written into every checkpoint file
///
/// Readers ignore unknown fields, so additive format changes keep the same
/// version; a reader confronted with a *higher* version fails fast instead
/// of guessing.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Durable record of crawl progress
///
/// The checkpoint only ever describes fully completed pages: it is
/// committed after a page's items are durably written, never before. On
/// resume, `next_page` is the exact locator to fetch next — stored
/// explicitly because cursor tokens are server-issued and cannot be
/// recomputed from `last_page`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlCheckpoint {
    pub version: u32,

    /// Hash of the config that produced this checkpoint, for drift warnings
    #[serde(default)]
    pub config_hash: Option<String>,

    /// Last page whose items were all persisted
    #[serde(default)]
    pub last_page: Option<PageLocator>,

    /// Next page to fetch; None once the sequence is exhausted
    #[serde(default)]
    pub next_page: Option<PageLocator>,

    /// Identifiers of every item persisted so far
    #[serde(default)]
    pub persisted_item_ids: BTreeSet<String>,

    /// Pages completed so far
    #[serde(default)]
    pub pages_completed: u64,

    /// Total fetch attempts, including retries
    #[serde(default)]
    pub fetch_attempts: u64,

    /// Transient failures seen, across all pages
    #[serde(default)]
    pub transient_failures: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CrawlCheckpoint {
    /// Creates a fresh checkpoint pointing at the start of the sequence
    pub fn new(start: PageLocator, config_hash: Option<String>) -> Self {
        let now = Utc::now();
        CrawlCheckpoint {
            version: CHECKPOINT_VERSION,
            config_hash,
            last_page: None,
            next_page: Some(start),
            persisted_item_ids: BTreeSet::new(),
            pages_completed: 0,
            fetch_attempts: 0,
            transient_failures: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records a fully completed page
    ///
    /// # Arguments
    ///
    /// * `page` - The locator that was just completed
    /// * `item_ids` - Identifiers persisted from this page (new ones only)
    /// * `next` - The locator to fetch next, or None at end of sequence
    pub fn record_page<I>(&mut self, page: PageLocator, item_ids: I, next: Option<PageLocator>)
    where
        I: IntoIterator<Item = String>,
    {
        self.persisted_item_ids.extend(item_ids);
        self.last_page = Some(page);
        self.next_page = next;
        self.pages_completed += 1;
        self.updated_at = Utc::now();
    }

    /// Marks the sequence exhausted without completing another page
    /// (the terminal empty page)
    pub fn mark_complete(&mut self) {
        self.next_page = None;
        self.updated_at = Utc::now();
    }

    /// Whether the crawl this checkpoint describes has finished
    pub fn is_complete(&self) -> bool {
        self.next_page.is_none()
    }

    /// Whether an item id has already been persisted
    pub fn contains_item(&self, id: &str) -> bool {
        self.persisted_item_ids.contains(id)
    }

    pub fn note_fetch_attempt(&mut self) {
        self.fetch_attempts += 1;
    }

    pub fn note_transient_failure(&mut self) {
        self.transient_failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checkpoint_points_at_start() {
        let cp = CrawlCheckpoint::new(PageLocator::first_page(), Some("abc".to_string()));

        assert_eq!(cp.version, CHECKPOINT_VERSION);
        assert_eq!(cp.next_page, Some(PageLocator::first_page()));
        assert!(cp.last_page.is_none());
        assert!(!cp.is_complete());
        assert_eq!(cp.pages_completed, 0);
    }

    #[test]
    fn test_record_page_advances() {
        let mut cp = CrawlCheckpoint::new(PageLocator::first_page(), None);
        cp.record_page(
            PageLocator::Offset { page: 1 },
            vec!["W1".to_string(), "W2".to_string()],
            Some(PageLocator::Offset { page: 2 }),
        );

        assert_eq!(cp.last_page, Some(PageLocator::Offset { page: 1 }));
        assert_eq!(cp.next_page, Some(PageLocator::Offset { page: 2 }));
        assert_eq!(cp.pages_completed, 1);
        assert!(cp.contains_item("W1"));
        assert!(cp.contains_item("W2"));
        assert!(!cp.contains_item("W3"));
    }

    #[test]
    fn test_mark_complete() {
        let mut cp = CrawlCheckpoint::new(PageLocator::first_page(), None);
        cp.mark_complete();
        assert!(cp.is_complete());
    }

    #[test]
    fn test_serde_ignores_unknown_fields() {
        let json = serde_json::json!({
            "version": 1,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
            "some_future_field": {"nested": true},
        })
        .to_string();

        let cp: CrawlCheckpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(cp.version, 1);
        assert!(cp.persisted_item_ids.is_empty());
    }
}
