//! Navigation session capability
//!
//! The crawl engine never owns a browser. It consumes a navigation
//! capability: point the session at a URL, get raw page content back. The
//! embedding application decides what actually drives the navigation — the
//! `HttpSession` here for plain HTTP, or a WebDriver-backed implementation
//! when the catalog is only reachable through a real browser.

use crate::config::SessionConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors produced by a navigation session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("navigation timed out")]
    Timeout,
}

/// Raw result of one navigation
#[derive(Debug, Clone)]
pub struct NavigatedPage {
    /// URL the session ended on (after redirects)
    pub final_url: String,

    /// HTTP status, when the transport exposes one. A browser-backed
    /// session may not.
    pub status: Option<u16>,

    /// Raw page body / page source
    pub body: String,
}

/// One navigation round trip per call; the session is singly owned and
/// only one navigation is in flight at a time.
#[async_trait]
pub trait PageSession: Send {
    /// Navigates to the URL and returns the resulting page
    async fn navigate(&mut self, url: &Url) -> Result<NavigatedPage, SessionError>;

    /// Returns the source of the most recently navigated page, if any
    fn current_page_source(&self) -> Option<&str>;
}

/// Plain-HTTP navigation session built on reqwest
///
/// User agent format: `Name/Version (+ContactUrl; ContactEmail)` — the
/// catalog operator can always tell who is harvesting and how to reach them.
pub struct HttpSession {
    client: Client,
    last_source: Option<String>,
}

impl HttpSession {
    /// Builds a session from the configured identity
    ///
    /// # Arguments
    ///
    /// * `config` - Session identification
    /// * `timeout` - Per-request time bound
    pub fn new(config: &SessionConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let user_agent = format!(
            "{}/{} (+{}; {})",
            config.harvester_name,
            config.harvester_version,
            config.contact_url,
            config.contact_email
        );

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(HttpSession {
            client,
            last_source: None,
        })
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &Url) -> Result<NavigatedPage, SessionError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                SessionError::Timeout
            } else if e.is_connect() {
                SessionError::Connect(e.to_string())
            } else {
                SessionError::Navigation(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SessionError::Timeout
            } else {
                SessionError::Navigation(e.to_string())
            }
        })?;

        self.last_source = Some(body.clone());

        Ok(NavigatedPage {
            final_url,
            status: Some(status),
            body,
        })
    }

    fn current_page_source(&self) -> Option<&str> {
        self.last_source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> SessionConfig {
        SessionConfig {
            harvester_name: "papermule".to_string(),
            harvester_version: "0.1".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "ops@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_session() {
        let config = create_test_config();
        let session = HttpSession::new(&config, Duration::from_secs(30));
        assert!(session.is_ok());
    }

    #[test]
    fn test_fresh_session_has_no_page_source() {
        let config = create_test_config();
        let session = HttpSession::new(&config, Duration::from_secs(30)).unwrap();
        assert!(session.current_page_source().is_none());
    }
}
