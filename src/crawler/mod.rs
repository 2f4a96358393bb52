//! Crawl state machine and orchestration

mod coordinator;
mod state;

pub use coordinator::{AbortReason, CrawlOutcome, CrawlReport, Crawler, StopHandle};
pub use state::CrawlState;
