//! Fetch outcome classification
//!
//! Every fetch attempt resolves to exactly one of three shapes: success,
//! a transient failure worth retrying, or a permanent failure that is not.
//! The retry policy never looks past this classification.

use std::fmt;

/// Retryable failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientKind {
    /// Transport-level failure or server error (5xx, connection reset, ...)
    Network,

    /// The fetch exceeded its hard time bound
    Timeout,

    /// The catalog signalled throttling (HTTP 429 or equivalent)
    Throttled,

    /// The sink refused the page's items; the whole page is retried
    SinkUnavailable,
}

/// Non-retryable failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermanentKind {
    /// The page does not exist (HTTP 404/410)
    NotFound,

    /// Authentication or authorization failure (HTTP 401/403)
    Unauthorized,

    /// The page was fetched but its record set is structurally invalid
    MalformedTerminal,

    /// The result sequence is exhausted; the normal success terminator
    EndOfSequence,
}

/// Raw content of one successfully fetched page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// URL the navigation ended on
    pub final_url: String,

    /// HTTP status, when the session exposes one
    pub status: Option<u16>,

    /// Raw page body
    pub body: String,
}

/// Tagged result of one fetch attempt
#[derive(Debug)]
pub enum FetchOutcome {
    Success(PageContent),
    Transient(TransientKind),
    Permanent(PermanentKind),
}

/// Failure classification handed to the retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient(TransientKind),
    Permanent(PermanentKind),
}

impl TransientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Throttled => "throttled",
            Self::SinkUnavailable => "sink-unavailable",
        }
    }
}

impl PermanentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::Unauthorized => "unauthorized",
            Self::MalformedTerminal => "malformed-terminal",
            Self::EndOfSequence => "end-of-sequence",
        }
    }
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for PermanentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(kind) => write!(f, "transient({})", kind),
            Self::Permanent(kind) => write!(f, "permanent({})", kind),
        }
    }
}

/// Maps an HTTP status code to a failure outcome
///
/// Returns None for success statuses; the caller keeps the body.
pub fn classify_http_status(status: u16) -> Option<FetchOutcome> {
    match status {
        200..=299 => None,
        401 | 403 => Some(FetchOutcome::Permanent(PermanentKind::Unauthorized)),
        404 | 410 => Some(FetchOutcome::Permanent(PermanentKind::NotFound)),
        429 => Some(FetchOutcome::Transient(TransientKind::Throttled)),
        _ => Some(FetchOutcome::Transient(TransientKind::Network)),
    }
}
