//! Crawl progress checkpointing
//!
//! The checkpoint is the single durable record of how far the crawl has
//! gotten. It is committed only after a page's items are safely persisted
//! (write-ahead: items first, checkpoint second), which is what makes
//! resume-after-interruption exact instead of approximate.

mod store;
mod types;

pub use store::{FileProgressStore, ProgressStore, StoreError, StoreResult};
pub use types::{CrawlCheckpoint, CHECKPOINT_VERSION};
