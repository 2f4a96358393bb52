//! Pacing: rate limiting and retry policy
//!
//! Two independent controls keep the crawl polite and robust:
//! - `RateLimiter` gates how fast fetch attempts are issued at all
//! - `RetryPolicy` decides whether a failed attempt is tried again, and
//!   after how long

mod rate_limiter;
mod retry;

pub use rate_limiter::RateLimiter;
pub use retry::{GiveUpReason, RetryDecision, RetryPolicy};
