use crate::catalog::PageLocator;
use serde::{Deserialize, Serialize};

/// One extracted catalog record, ready to persist
///
/// The identifier is stable across re-fetches of the same page, so an item
/// is persisted at most once per crawl even when a page is re-processed
/// after a resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlItem {
    /// Normalized record identifier (e.g. "W2741809807")
    pub id: String,

    /// The raw record as returned by the catalog
    pub payload: serde_json::Value,

    /// The page this item was extracted from
    pub source: PageLocator,
}

impl CrawlItem {
    /// Returns a filesystem-safe version of the identifier
    ///
    /// Anything outside `[A-Za-z0-9._-]` is replaced with an underscore.
    pub fn file_stem(&self) -> String {
        self.id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}
