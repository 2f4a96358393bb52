use crate::catalog::CrawlItem;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while persisting an item
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Persistence destination for extracted items
///
/// The target medium is the sink's business; the crawler only requires
/// that a returned `Ok` means the item is durably written, and that
/// persisting the same id twice is harmless (it happens when a partially
/// processed page is re-fetched after a resume).
#[async_trait]
pub trait Sink: Send {
    /// Durably writes one item
    async fn persist(&mut self, item: &CrawlItem) -> SinkResult<()>;
}
