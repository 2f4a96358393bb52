//! Papermule: a resumable harvester for paginated catalog records
//!
//! This crate implements the crawl/download engine behind a browser-driven
//! OpenAlex record harvester: it walks an ordered result set page by page,
//! extracts records from each page, persists them through a sink, and
//! checkpoints progress so an interrupted crawl resumes at the exact page
//! it stopped on. Fetch pacing and retry/backoff keep the remote catalog
//! from being overwhelmed.

pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod fetch;
pub mod pacing;
pub mod sink;

use thiserror::Error;

/// Main error type for Papermule operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint store error: {0}")]
    Store(#[from] checkpoint::StoreError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("Session error: {0}")]
    Session(#[from] fetch::SessionError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Papermule operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{CrawlItem, PageLocator};
pub use checkpoint::{CrawlCheckpoint, FileProgressStore, ProgressStore};
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlReport, CrawlState, Crawler};
pub use fetch::{CatalogFetcher, FetchOutcome, HttpSession, PageFetcher};
pub use pacing::{RateLimiter, RetryDecision, RetryPolicy};
pub use sink::{FileSink, Sink};
