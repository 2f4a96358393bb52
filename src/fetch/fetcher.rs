//! Page fetching against the catalog
//!
//! `CatalogFetcher` turns a page locator into a request URL, drives the
//! navigation session once, and classifies what came back. It performs
//! exactly one round trip per call and never retries internally — retry
//! decisions belong to the retry policy, pacing to the rate limiter.

use crate::catalog::PageLocator;
use crate::fetch::outcome::{classify_http_status, FetchOutcome, PageContent, TransientKind};
use crate::fetch::session::{PageSession, SessionError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Fetches one page of the result sequence per call
#[async_trait]
pub trait PageFetcher: Send {
    /// Performs a single fetch attempt for the page at `locator`
    async fn fetch(&mut self, locator: &PageLocator) -> FetchOutcome;
}

/// `PageFetcher` over a navigation session and a catalog endpoint
pub struct CatalogFetcher<S: PageSession> {
    session: S,
    base_url: Url,
    per_page: u32,
    filter: Option<String>,
    timeout: Duration,
}

impl<S: PageSession> CatalogFetcher<S> {
    /// Creates a fetcher for the given endpoint
    ///
    /// # Arguments
    ///
    /// * `session` - The navigation session (singly owned by this fetcher)
    /// * `base_url` - Catalog listing endpoint
    /// * `per_page` - Records requested per page
    /// * `filter` - Optional catalog filter expression
    /// * `timeout` - Hard upper bound on one fetch
    pub fn new(
        session: S,
        base_url: Url,
        per_page: u32,
        filter: Option<String>,
        timeout: Duration,
    ) -> Self {
        CatalogFetcher {
            session,
            base_url,
            per_page,
            filter,
            timeout,
        }
    }

    /// Consumes the fetcher and returns the session
    pub fn into_session(self) -> S {
        self.session
    }
}

#[async_trait]
impl<S: PageSession> PageFetcher for CatalogFetcher<S> {
    async fn fetch(&mut self, locator: &PageLocator) -> FetchOutcome {
        let url = locator.request_url(&self.base_url, self.per_page, self.filter.as_deref());
        tracing::debug!(page = %locator, url = %url, "fetching page");

        // The session may carry its own timeout; this bound also covers
        // sessions that do not.
        let navigated = match tokio::time::timeout(self.timeout, self.session.navigate(&url)).await
        {
            Err(_) => return FetchOutcome::Transient(TransientKind::Timeout),
            Ok(Err(e)) => return classify_session_error(e),
            Ok(Ok(page)) => page,
        };

        if let Some(status) = navigated.status {
            if let Some(outcome) = classify_http_status(status) {
                tracing::debug!(page = %locator, status, "non-success status");
                return outcome;
            }
        }

        // A body with nothing in it is a truncated or half-rendered
        // response, not an empty result page.
        if navigated.body.trim().is_empty() {
            return FetchOutcome::Transient(TransientKind::Network);
        }

        FetchOutcome::Success(PageContent {
            final_url: navigated.final_url,
            status: navigated.status,
            body: navigated.body,
        })
    }
}

fn classify_session_error(error: SessionError) -> FetchOutcome {
    match error {
        SessionError::Timeout => FetchOutcome::Transient(TransientKind::Timeout),
        SessionError::Connect(_) | SessionError::Navigation(_) => {
            FetchOutcome::Transient(TransientKind::Network)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::outcome::PermanentKind;
    use crate::fetch::session::NavigatedPage;

    /// Session that replays a scripted sequence of navigation results
    struct ScriptedSession {
        results: Vec<Result<NavigatedPage, SessionError>>,
        calls: usize,
    }

    impl ScriptedSession {
        fn new(results: Vec<Result<NavigatedPage, SessionError>>) -> Self {
            ScriptedSession { results, calls: 0 }
        }
    }

    #[async_trait]
    impl PageSession for ScriptedSession {
        async fn navigate(&mut self, _url: &Url) -> Result<NavigatedPage, SessionError> {
            let result = self.results.remove(0);
            self.calls += 1;
            result
        }

        fn current_page_source(&self) -> Option<&str> {
            None
        }
    }

    fn fetcher_with(
        results: Vec<Result<NavigatedPage, SessionError>>,
    ) -> CatalogFetcher<ScriptedSession> {
        CatalogFetcher::new(
            ScriptedSession::new(results),
            Url::parse("https://api.openalex.org/works").unwrap(),
            100,
            None,
            Duration::from_secs(5),
        )
    }

    fn ok_page(status: u16, body: &str) -> Result<NavigatedPage, SessionError> {
        Ok(NavigatedPage {
            final_url: "https://api.openalex.org/works".to_string(),
            status: Some(status),
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn test_success_passes_body_through() {
        let mut fetcher = fetcher_with(vec![ok_page(200, r#"{"results": []}"#)]);
        let outcome = fetcher.fetch(&PageLocator::first_page()).await;

        match outcome {
            FetchOutcome::Success(content) => {
                assert_eq!(content.status, Some(200));
                assert_eq!(content.body, r#"{"results": []}"#);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_permanent() {
        let mut fetcher = fetcher_with(vec![ok_page(403, "")]);
        let outcome = fetcher.fetch(&PageLocator::first_page()).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Permanent(PermanentKind::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_throttled_status() {
        let mut fetcher = fetcher_with(vec![ok_page(429, "slow down")]);
        let outcome = fetcher.fetch(&PageLocator::first_page()).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Transient(TransientKind::Throttled)
        ));
    }

    #[tokio::test]
    async fn test_session_timeout_is_transient() {
        let mut fetcher = fetcher_with(vec![Err(SessionError::Timeout)]);
        let outcome = fetcher.fetch(&PageLocator::first_page()).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Transient(TransientKind::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transient() {
        let mut fetcher = fetcher_with(vec![Err(SessionError::Connect("refused".to_string()))]);
        let outcome = fetcher.fetch(&PageLocator::first_page()).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Transient(TransientKind::Network)
        ));
    }

    #[tokio::test]
    async fn test_blank_body_is_transient() {
        let mut fetcher = fetcher_with(vec![ok_page(200, "   \n  ")]);
        let outcome = fetcher.fetch(&PageLocator::first_page()).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Transient(TransientKind::Network)
        ));
    }
}
