//! Catalog data model: page locators, items, and extraction
//!
//! This module defines how the paginated result sequence is addressed
//! (`PageLocator`), what one persisted unit looks like (`CrawlItem`), and
//! how records are extracted from raw page content.

mod extract;
mod item;
mod locator;

pub use extract::{extract_items, ExtractError, ExtractedPage};
pub use item::CrawlItem;
pub use locator::{Advance, PageLocator};
