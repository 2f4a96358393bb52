/// Crawl state definitions
///
/// The crawler moves through a small state machine: it starts, pages
/// forward, drains retries for a failing page, and ends in exactly one of
/// two terminal states.
use std::fmt;

/// Current state of the crawl state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Loading the checkpoint and picking the start locator
    Starting,

    /// Walking the page sequence normally
    Paging,

    /// The current page failed transiently and is being retried
    Draining,

    /// The sequence was exhausted; every page's items are persisted
    Completed,

    /// The crawl stopped early; the checkpoint still points at the
    /// failing page, so a rerun resumes exactly there
    Aborted,
}

impl CrawlState {
    /// Returns true if no further fetches will occur in this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Paging => "paging",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlState::Starting.is_terminal());
        assert!(!CrawlState::Paging.is_terminal());
        assert!(!CrawlState::Draining.is_terminal());

        assert!(CrawlState::Completed.is_terminal());
        assert!(CrawlState::Aborted.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlState::Paging), "paging");
        assert_eq!(format!("{}", CrawlState::Draining), "draining");
        assert_eq!(format!("{}", CrawlState::Completed), "completed");
    }
}
