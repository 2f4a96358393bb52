use serde::Deserialize;
use std::time::Duration;

use crate::catalog::PageLocator;

/// Main configuration structure for Papermule
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub session: SessionConfig,
    pub pacing: PacingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub output: OutputConfig,
}

/// Which pagination scheme the catalog is walked with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Server-issued cursor tokens (`cursor=*` to start). Required by
    /// OpenAlex for result sets deeper than 10k records.
    Cursor,
    /// Plain 1-based `page=N` offsets.
    Offset,
}

impl Default for PagingMode {
    fn default() -> Self {
        PagingMode::Cursor
    }
}

/// Catalog endpoint and paging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the paginated listing (e.g. "https://api.openalex.org/works")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Optional filter expression appended to every page request
    /// (e.g. "is_oa:true,has_pdf_url:true,has_doi:true")
    #[serde(default)]
    pub filter: Option<String>,

    /// Records requested per page
    #[serde(rename = "per-page", default = "default_per_page")]
    pub per_page: u32,

    /// Pagination scheme
    #[serde(default)]
    pub paging: PagingMode,

    /// Hard upper bound on a single fetch, in seconds
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl CatalogConfig {
    /// Returns the locator the crawl sequence starts from
    pub fn start_locator(&self) -> PageLocator {
        match self.paging {
            PagingMode::Cursor => PageLocator::cursor_start(),
            PagingMode::Offset => PageLocator::first_page(),
        }
    }

    /// Returns the per-fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Identification for the navigation session
///
/// The contact fields end up in the user-agent string so catalog operators
/// can reach whoever is running the harvest.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(rename = "harvester-name")]
    pub harvester_name: String,

    #[serde(rename = "harvester-version")]
    pub harvester_version: String,

    #[serde(rename = "contact-url")]
    pub contact_url: String,

    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Rate limiter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Permits issued per interval window
    #[serde(rename = "requests-per-interval")]
    pub requests_per_interval: u32,

    /// Length of the interval window in milliseconds
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,

    /// Maximum permits usable back-to-back within one window
    #[serde(rename = "burst-allowance", default = "default_burst")]
    pub burst_allowance: u32,

    /// Whether throttling signals stretch the interval adaptively
    #[serde(default = "default_adaptive")]
    pub adaptive: bool,

    /// Multiplier applied to the interval on each throttling signal
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Ceiling the adaptive interval never exceeds, in milliseconds
    #[serde(rename = "max-interval-ms", default = "default_max_interval")]
    pub max_interval_ms: u64,

    /// Consecutive successes before the interval decays toward baseline
    #[serde(rename = "decay-after-successes", default = "default_decay_after")]
    pub decay_after_successes: u32,
}

impl PacingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Give up on a page once this many attempts have been made
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for the first retry, in milliseconds
    #[serde(rename = "base-delay-ms", default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Cap on any single retry delay, in milliseconds
    #[serde(rename = "max-delay-ms", default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the downloaded records are written into
    #[serde(rename = "download-dir")]
    pub download_dir: String,

    /// Path of the JSON checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}

fn default_per_page() -> u32 {
    100
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_burst() -> u32 {
    1
}

fn default_adaptive() -> bool {
    true
}

fn default_backoff_factor() -> f64 {
    1.5
}

fn default_max_interval() -> u64 {
    60_000
}

fn default_decay_after() -> u32 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30_000
}
