//! Token-bucket rate limiter with adaptive slowdown
//!
//! Fetches are gated through `acquire()`: the bucket refills at
//! `requests-per-interval` tokens per interval and holds at most
//! `burst-allowance` tokens, so no window ever sees more than the allowed
//! burst. In adaptive mode a throttling signal stretches the interval by
//! the backoff factor (up to a ceiling) and a run of successes shrinks it
//! back toward the configured baseline.
//!
//! All waiting goes through tokio time, so tests run under a paused clock.

use crate::config::PacingConfig;
use std::time::Duration;
use tokio::time::Instant;

/// Paces fetch attempts against the catalog
pub struct RateLimiter {
    config: PacingConfig,
    baseline_interval: Duration,
    current_interval: Duration,
    tokens: f64,
    last_refill: Instant,
    success_streak: u32,
}

impl RateLimiter {
    /// Creates a limiter with a full burst available immediately
    pub fn new(config: PacingConfig) -> Self {
        let baseline = config.interval();
        RateLimiter {
            tokens: config.burst_allowance as f64,
            baseline_interval: baseline,
            current_interval: baseline,
            last_refill: Instant::now(),
            success_streak: 0,
            config,
        }
    }

    /// Blocks until a fetch permit is available, then consumes it
    pub async fn acquire(&mut self) {
        loop {
            self.refill();
            if self.tokens >= 1.0 {
                self.tokens -= 1.0;
                return;
            }

            let deficit = 1.0 - self.tokens;
            let wait = self.per_token().mul_f64(deficit);
            tracing::trace!(?wait, "rate limiter waiting for permit");
            tokio::time::sleep(wait).await;
        }
    }

    /// Notes a throttling signal from the catalog
    ///
    /// In adaptive mode the pacing interval grows by the backoff factor,
    /// clamped to the configured ceiling.
    pub fn note_throttled(&mut self) {
        self.success_streak = 0;
        if !self.config.adaptive {
            return;
        }

        self.refill();
        let stretched = self.current_interval.mul_f64(self.config.backoff_factor);
        self.current_interval = stretched.min(self.config.max_interval());
        tracing::info!(
            interval_ms = self.current_interval.as_millis() as u64,
            "throttled; pacing interval stretched"
        );
    }

    /// Notes a successful fetch
    ///
    /// After the configured number of consecutive successes the interval
    /// decays one step back toward the baseline.
    pub fn note_success(&mut self) {
        if !self.config.adaptive || self.current_interval == self.baseline_interval {
            return;
        }

        self.success_streak += 1;
        if self.success_streak >= self.config.decay_after_successes {
            self.success_streak = 0;
            self.refill();
            let relaxed = self.current_interval.div_f64(self.config.backoff_factor);
            self.current_interval = relaxed.max(self.baseline_interval);
            tracing::debug!(
                interval_ms = self.current_interval.as_millis() as u64,
                "pacing interval decayed toward baseline"
            );
        }
    }

    /// The interval currently in effect (baseline unless stretched)
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    fn per_token(&self) -> Duration {
        self.current_interval
            .div_f64(self.config.requests_per_interval as f64)
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        self.last_refill = now;

        let per_token = self.per_token();
        if per_token.is_zero() {
            self.tokens = self.config.burst_allowance as f64;
            return;
        }

        let gained = elapsed.as_secs_f64() / per_token.as_secs_f64();
        self.tokens = (self.tokens + gained).min(self.config.burst_allowance as f64);
    }
}
