//! Page fetching: session capability, fetcher, and outcome classification
//!
//! This module owns everything between a page locator and a classified
//! fetch outcome:
//! - The `PageSession` navigation capability (and the reqwest-backed
//!   `HttpSession` default)
//! - The `PageFetcher` trait and its `CatalogFetcher` implementation
//! - The transient/permanent failure taxonomy the retry policy acts on

mod fetcher;
mod outcome;
mod session;

pub use fetcher::{CatalogFetcher, PageFetcher};
pub use outcome::{
    classify_http_status, FailureClass, FetchOutcome, PageContent, PermanentKind, TransientKind,
};
pub use session::{HttpSession, NavigatedPage, PageSession, SessionError};
