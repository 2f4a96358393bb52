//! Retry policy: bounded exponential backoff with jitter
//!
//! The policy is the sole decision point for retry-vs-give-up. It retries
//! only transient failures; permanent failures and exhausted attempt
//! budgets end the page immediately. Delays double per attempt up to a cap,
//! then a uniform jitter in [0.5, 1.5] spreads retries out so interrupted
//! crawls do not stampede the catalog in lockstep.

use crate::config::RetryConfig;
use crate::fetch::{FailureClass, PermanentKind};
use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Why the policy gave up on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiveUpReason {
    /// The failure was permanent; retrying cannot help
    Permanent(PermanentKind),

    /// The attempt budget was exhausted on transient failures
    AttemptsExhausted { attempts: u32 },
}

impl fmt::Display for GiveUpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent(kind) => write!(f, "permanent failure: {}", kind),
            Self::AttemptsExhausted { attempts } => {
                write!(f, "gave up after {} attempts", attempts)
            }
        }
    }
}

/// The policy's verdict for one failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after this delay
    Retry(Duration),

    /// Stop retrying this page
    GiveUp(GiveUpReason),
}

/// Decides whether and when a failed fetch is retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.max_delay())
    }

    /// Decides the fate of attempt number `attempt` (1-based) that failed
    /// with `failure`
    ///
    /// # Returns
    ///
    /// * `Retry(delay)` - The failure was transient and budget remains
    /// * `GiveUp(reason)` - Permanent failure, or the budget is spent
    pub fn decide(&self, attempt: u32, failure: FailureClass) -> RetryDecision {
        match failure {
            FailureClass::Permanent(kind) => RetryDecision::GiveUp(GiveUpReason::Permanent(kind)),
            FailureClass::Transient(_) => {
                if attempt >= self.max_attempts {
                    RetryDecision::GiveUp(GiveUpReason::AttemptsExhausted { attempts: attempt })
                } else {
                    RetryDecision::Retry(self.jittered_delay(attempt))
                }
            }
        }
    }

    /// The un-jittered delay for attempt number `attempt` (1-based):
    /// `base * 2^(attempt-1)`, capped at the configured maximum
    ///
    /// Non-decreasing in the attempt number, which is what makes backoff
    /// backoff.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let factor = 2u32.saturating_pow(exponent);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered_delay(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.5..=1.5);
        self.backoff_delay(attempt).mul_f64(jitter).min(self.max_delay.mul_f64(1.5))
    }
}
