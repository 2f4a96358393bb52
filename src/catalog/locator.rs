//! Page locators for the paginated result sequence
//!
//! A locator is the opaque cursor identifying one page of results. It
//! strictly orders the sequence: advancing from a locator deterministically
//! yields the next locator or the end of the sequence.

use crate::catalog::extract::ExtractedPage;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Identifies one page of the catalog result sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PageLocator {
    /// Server-issued cursor token ("*" starts the sequence)
    Cursor { token: String },

    /// 1-based page number
    Offset { page: u32 },
}

/// Result of advancing past a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The sequence continues at this locator
    Next(PageLocator),

    /// The sequence is exhausted
    End,
}

impl PageLocator {
    /// Returns the first locator of a cursor-paged sequence
    pub fn cursor_start() -> Self {
        PageLocator::Cursor {
            token: "*".to_string(),
        }
    }

    /// Returns the first locator of an offset-paged sequence
    pub fn first_page() -> Self {
        PageLocator::Offset { page: 1 }
    }

    /// Builds the request URL for this page
    ///
    /// # Arguments
    ///
    /// * `base` - The catalog listing endpoint
    /// * `per_page` - Records requested per page
    /// * `filter` - Optional catalog filter expression
    pub fn request_url(&self, base: &Url, per_page: u32, filter: Option<&str>) -> Url {
        let mut url = base.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(filter) = filter {
                query.append_pair("filter", filter);
            }
            query.append_pair("per-page", &per_page.to_string());
            match self {
                PageLocator::Cursor { token } => {
                    query.append_pair("cursor", token);
                }
                PageLocator::Offset { page } => {
                    query.append_pair("page", &page.to_string());
                }
            }
        }
        url
    }

    /// Computes the locator that follows this page, given what the page
    /// actually contained
    ///
    /// Cursor sequences follow the server-issued `next_cursor`; offset
    /// sequences increment the page number. An empty page ends the sequence
    /// in either mode, as does a missing cursor token.
    pub fn advance(&self, page: &ExtractedPage) -> Advance {
        if page.items.is_empty() {
            return Advance::End;
        }

        match self {
            PageLocator::Cursor { .. } => match &page.next_cursor {
                Some(token) => Advance::Next(PageLocator::Cursor {
                    token: token.clone(),
                }),
                None => Advance::End,
            },
            PageLocator::Offset { page: n } => Advance::Next(PageLocator::Offset { page: n + 1 }),
        }
    }
}

impl fmt::Display for PageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLocator::Cursor { token } => write!(f, "cursor:{}", token),
            PageLocator::Offset { page } => write!(f, "page:{}", page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CrawlItem;

    fn page_with(items: usize, next_cursor: Option<&str>) -> ExtractedPage {
        let source = PageLocator::first_page();
        ExtractedPage {
            items: (0..items)
                .map(|i| CrawlItem {
                    id: format!("W{}", i),
                    payload: serde_json::json!({"id": format!("W{}", i)}),
                    source: source.clone(),
                })
                .collect(),
            next_cursor: next_cursor.map(str::to_string),
            total_count: None,
        }
    }

    #[test]
    fn test_request_url_offset() {
        let base = Url::parse("https://api.openalex.org/works").unwrap();
        let locator = PageLocator::Offset { page: 3 };
        let url = locator.request_url(&base, 50, Some("is_oa:true"));

        assert_eq!(
            url.as_str(),
            "https://api.openalex.org/works?filter=is_oa%3Atrue&per-page=50&page=3"
        );
    }

    #[test]
    fn test_request_url_cursor() {
        let base = Url::parse("https://api.openalex.org/works").unwrap();
        let locator = PageLocator::cursor_start();
        let url = locator.request_url(&base, 100, None);

        assert_eq!(
            url.as_str(),
            "https://api.openalex.org/works?per-page=100&cursor=*"
        );
    }

    #[test]
    fn test_advance_offset_increments() {
        let locator = PageLocator::Offset { page: 4 };
        assert_eq!(
            locator.advance(&page_with(10, None)),
            Advance::Next(PageLocator::Offset { page: 5 })
        );
    }

    #[test]
    fn test_advance_empty_page_ends_sequence() {
        let offset = PageLocator::Offset { page: 4 };
        assert_eq!(offset.advance(&page_with(0, None)), Advance::End);

        // An empty page ends a cursor sequence even if a token is present
        let cursor = PageLocator::cursor_start();
        assert_eq!(cursor.advance(&page_with(0, Some("tok"))), Advance::End);
    }

    #[test]
    fn test_advance_cursor_follows_token() {
        let locator = PageLocator::cursor_start();
        assert_eq!(
            locator.advance(&page_with(10, Some("IlsxNjA5MzcyODAwMDAwXSI="))),
            Advance::Next(PageLocator::Cursor {
                token: "IlsxNjA5MzcyODAwMDAwXSI=".to_string()
            })
        );
    }

    #[test]
    fn test_advance_cursor_missing_token_ends() {
        let locator = PageLocator::cursor_start();
        assert_eq!(locator.advance(&page_with(10, None)), Advance::End);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageLocator::Offset { page: 7 }), "page:7");
        assert_eq!(format!("{}", PageLocator::cursor_start()), "cursor:*");
    }

    #[test]
    fn test_serde_roundtrip() {
        let locator = PageLocator::Cursor {
            token: "abc".to_string(),
        };
        let json = serde_json::to_string(&locator).unwrap();
        let back: PageLocator = serde_json::from_str(&json).unwrap();
        assert_eq!(locator, back);
    }
}
