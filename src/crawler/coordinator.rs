//! Crawl orchestration
//!
//! The `Crawler` drives the page sequence: every page fetch goes through
//! the rate limiter and the retry policy, successful pages are extracted
//! and persisted through the sink, and only then is the checkpoint
//! advanced. Two ordering rules hold throughout:
//!
//! - Items are durably written before the checkpoint that counts them,
//!   so progress is never recorded for unpersisted data.
//! - Checkpoint commits are strictly ordered with the page sequence; the
//!   crawl never fetches page N+1 before page N's commit has landed.

use crate::catalog::{extract_items, Advance, ExtractError, PageLocator};
use crate::checkpoint::{CrawlCheckpoint, ProgressStore};
use crate::crawler::state::CrawlState;
use crate::fetch::{
    FailureClass, FetchOutcome, PageContent, PageFetcher, PermanentKind, TransientKind,
};
use crate::pacing::{GiveUpReason, RateLimiter, RetryDecision, RetryPolicy};
use crate::sink::Sink;
use crate::HarvestError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal, checked between pages
///
/// Requesting a stop never interrupts a fetch in flight; the pending fetch
/// completes (or times out on its own bound) and the crawl aborts before
/// the next page.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        StopHandle::default()
    }

    /// Asks the crawler to abort at the next page boundary
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages completed during this run (not counting resumed history)
    pub pages_completed: u64,

    /// Items newly persisted during this run
    pub items_persisted: u64,

    /// Items skipped because the checkpoint already recorded them
    pub items_skipped: u64,

    /// Fetch attempts made, including retries
    pub fetch_attempts: u64,

    /// Retry events, each one following a transient failure
    pub retries: u64,
}

/// Why an aborted crawl stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The retry policy gave up on a page
    GaveUp(GiveUpReason),

    /// An external stop was requested
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GaveUp(reason) => write!(f, "{}", reason),
            Self::Cancelled => write!(f, "stop requested"),
        }
    }
}

/// Terminal result of a crawl run
///
/// `Aborted` is recoverable: the checkpoint still names the failing page
/// as next, so rerunning resumes exactly there.
#[derive(Debug)]
pub enum CrawlOutcome {
    Completed(CrawlReport),
    Aborted {
        locator: PageLocator,
        reason: AbortReason,
        report: CrawlReport,
    },
}

/// What happened to one page, after all retries
enum PageStep {
    Advance(PageLocator),
    End,
    Abort(GiveUpReason),
}

/// Outcome of processing one successfully fetched page body
enum PageCompletion {
    Advance(PageLocator),
    End,
    Failed(FailureClass),
}

/// The crawl session: owns the fetcher, pacing, progress store, and sink
/// for one run, and drives the page sequence to a terminal state
pub struct Crawler<F, P, S>
where
    F: PageFetcher,
    P: ProgressStore,
    S: Sink,
{
    fetcher: F,
    store: P,
    sink: S,
    limiter: RateLimiter,
    policy: RetryPolicy,
    start: PageLocator,
    config_hash: Option<String>,
    state: CrawlState,
    stop: StopHandle,
}

impl<F, P, S> Crawler<F, P, S>
where
    F: PageFetcher,
    P: ProgressStore,
    S: Sink,
{
    /// Creates a crawler ready to run
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetches one page per call
    /// * `store` - Durable checkpoint store (may hold a previous run's state)
    /// * `sink` - Persistence destination for extracted items
    /// * `limiter` - Fetch pacing
    /// * `policy` - Retry policy for failed fetches
    /// * `start` - First locator of a fresh sequence (ignored on resume)
    pub fn new(
        fetcher: F,
        store: P,
        sink: S,
        limiter: RateLimiter,
        policy: RetryPolicy,
        start: PageLocator,
    ) -> Self {
        Crawler {
            fetcher,
            store,
            sink,
            limiter,
            policy,
            start,
            config_hash: None,
            state: CrawlState::Starting,
            stop: StopHandle::new(),
        }
    }

    /// Records the configuration hash in fresh checkpoints and warns when
    /// a resumed checkpoint was written under a different configuration
    pub fn with_config_hash(mut self, hash: String) -> Self {
        self.config_hash = Some(hash);
        self
    }

    /// Handle for requesting a graceful stop from outside the crawl loop
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current state of the crawl state machine
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl to a terminal state
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The crawl reached `Completed` or `Aborted`
    /// * `Err(HarvestError)` - A fatal error (checkpoint IO and the like);
    ///   the last committed checkpoint is intact
    pub async fn run(&mut self) -> Result<CrawlOutcome, HarvestError> {
        self.state = CrawlState::Starting;
        let mut report = CrawlReport::default();

        let mut checkpoint = match self.store.load()? {
            Some(cp) => {
                if let (Some(expected), Some(found)) = (&self.config_hash, &cp.config_hash) {
                    if expected != found {
                        tracing::warn!(
                            "configuration changed since the checkpoint was written; resuming anyway"
                        );
                    }
                }
                cp
            }
            None => {
                tracing::info!(start = %self.start, "no checkpoint found; starting fresh");
                CrawlCheckpoint::new(self.start.clone(), self.config_hash.clone())
            }
        };

        let mut current = match checkpoint.next_page.clone() {
            Some(locator) => {
                if checkpoint.pages_completed > 0 {
                    tracing::info!(
                        pages_completed = checkpoint.pages_completed,
                        resume_at = %locator,
                        "resuming from checkpoint"
                    );
                }
                locator
            }
            None => {
                tracing::info!("checkpoint marks the crawl complete; nothing to do");
                self.state = CrawlState::Completed;
                return Ok(CrawlOutcome::Completed(report));
            }
        };

        self.state = CrawlState::Paging;
        let started = std::time::Instant::now();

        loop {
            if self.stop.is_stopped() {
                tracing::info!(page = %current, "stop requested; aborting between pages");
                self.state = CrawlState::Aborted;
                return Ok(CrawlOutcome::Aborted {
                    locator: current,
                    reason: AbortReason::Cancelled,
                    report,
                });
            }

            let page = current.clone();
            match self.process_page(&page, &mut checkpoint, &mut report).await? {
                PageStep::Advance(next) => {
                    self.state = CrawlState::Paging;
                    current = next;

                    if report.pages_completed % 10 == 0 {
                        let elapsed = started.elapsed();
                        let rate =
                            report.pages_completed as f64 / elapsed.as_secs_f64().max(0.001);
                        tracing::info!(
                            pages = report.pages_completed,
                            items = report.items_persisted,
                            pages_per_sec = format!("{:.2}", rate),
                            "progress"
                        );
                    }
                }
                PageStep::End => break,
                PageStep::Abort(reason) => {
                    self.state = CrawlState::Aborted;
                    tracing::error!(page = %current, %reason, "crawl aborted");
                    return Ok(CrawlOutcome::Aborted {
                        locator: current,
                        reason: AbortReason::GaveUp(reason),
                        report,
                    });
                }
            }
        }

        self.state = CrawlState::Completed;
        tracing::info!(
            pages = report.pages_completed,
            items = report.items_persisted,
            skipped = report.items_skipped,
            retries = report.retries,
            elapsed = ?started.elapsed(),
            "crawl completed"
        );
        Ok(CrawlOutcome::Completed(report))
    }

    /// Fetches and processes one page, retrying transient failures per the
    /// retry policy
    async fn process_page(
        &mut self,
        locator: &PageLocator,
        checkpoint: &mut CrawlCheckpoint,
        report: &mut CrawlReport,
    ) -> Result<PageStep, HarvestError> {
        let mut attempt: u32 = 1;

        loop {
            self.limiter.acquire().await;
            checkpoint.note_fetch_attempt();
            report.fetch_attempts += 1;

            let outcome = self.fetcher.fetch(locator).await;
            let failure = match outcome {
                FetchOutcome::Success(content) => {
                    match self
                        .complete_page(locator, &content, checkpoint, report)
                        .await?
                    {
                        PageCompletion::Advance(next) => {
                            self.limiter.note_success();
                            return Ok(PageStep::Advance(next));
                        }
                        PageCompletion::End => {
                            self.limiter.note_success();
                            return Ok(PageStep::End);
                        }
                        PageCompletion::Failed(class) => class,
                    }
                }
                FetchOutcome::Permanent(PermanentKind::EndOfSequence) => {
                    // Normal terminator, not an error
                    checkpoint.mark_complete();
                    self.store.commit(checkpoint)?;
                    return Ok(PageStep::End);
                }
                FetchOutcome::Transient(kind) => FailureClass::Transient(kind),
                FetchOutcome::Permanent(kind) => FailureClass::Permanent(kind),
            };

            if let FailureClass::Transient(kind) = failure {
                checkpoint.note_transient_failure();
                if kind == TransientKind::Throttled {
                    self.limiter.note_throttled();
                }
            }

            match self.policy.decide(attempt, failure) {
                RetryDecision::Retry(delay) => {
                    report.retries += 1;
                    self.state = CrawlState::Draining;
                    tracing::warn!(
                        page = %locator,
                        attempt,
                        failure = %failure,
                        delay_ms = delay.as_millis() as u64,
                        "page fetch failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp(reason) => {
                    return Ok(PageStep::Abort(reason));
                }
            }
        }
    }

    /// Extracts, dedups, persists, and checkpoints one fetched page body
    async fn complete_page(
        &mut self,
        locator: &PageLocator,
        content: &PageContent,
        checkpoint: &mut CrawlCheckpoint,
        report: &mut CrawlReport,
    ) -> Result<PageCompletion, HarvestError> {
        let extracted = match extract_items(&content.body, locator) {
            Ok(page) => page,
            Err(ExtractError::MalformedRecords(message)) => {
                tracing::error!(page = %locator, %message, "record set is structurally invalid");
                return Ok(PageCompletion::Failed(FailureClass::Permanent(
                    PermanentKind::MalformedTerminal,
                )));
            }
            Err(error) => {
                // Interstitial or truncated page source; backoff gives it
                // time to clear
                tracing::warn!(page = %locator, %error, "no record set in page source");
                return Ok(PageCompletion::Failed(FailureClass::Transient(
                    TransientKind::Network,
                )));
            }
        };

        if extracted.items.is_empty() {
            tracing::info!(page = %locator, "empty page; sequence exhausted");
            checkpoint.mark_complete();
            self.store.commit(checkpoint)?;
            return Ok(PageCompletion::End);
        }

        let advance = locator.advance(&extracted);

        let mut new_ids = Vec::new();
        for item in &extracted.items {
            if self.store.contains_item(&item.id) {
                report.items_skipped += 1;
                tracing::debug!(id = %item.id, "item already persisted; skipping");
                continue;
            }
            if let Err(error) = self.sink.persist(item).await {
                tracing::warn!(id = %item.id, %error, "sink refused item; page will be retried");
                return Ok(PageCompletion::Failed(FailureClass::Transient(
                    TransientKind::SinkUnavailable,
                )));
            }
            new_ids.push(item.id.clone());
        }
        report.items_persisted += new_ids.len() as u64;

        // Items are durably written at this point; only now may the
        // checkpoint count them.
        let next = match advance {
            Advance::Next(next) => Some(next),
            Advance::End => None,
        };
        checkpoint.record_page(locator.clone(), new_ids, next.clone());
        self.store.commit(checkpoint)?;
        report.pages_completed += 1;

        tracing::info!(
            page = %locator,
            items = extracted.items.len(),
            total_pages = checkpoint.pages_completed,
            "page completed"
        );

        match next {
            Some(next) => Ok(PageCompletion::Advance(next)),
            None => Ok(PageCompletion::End),
        }
    }
}
