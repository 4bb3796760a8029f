//! Retry with exponential backoff for provider requests.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Backoff schedule for provider requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,
    /// Base for the exponential backoff, in milliseconds.
    #[serde(with = "crate::serde_millis")]
    pub base_delay: Duration,
    /// Upper bound on a single delay, in milliseconds.
    #[serde(with = "crate::serde_millis")]
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Add random jitter (up to +25%) to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(4),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Sleep before retry number `attempt`; the first try (0) never waits.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let Some(exponent) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };
        let factor = self.backoff_multiplier.max(1.0).powi(exponent as i32);
        let ceiling = self.max_delay.as_millis() as f64;
        let millis = (self.base_delay.as_millis() as f64 * factor).min(ceiling) as u64;

        let spread = if self.jitter { millis / 4 } else { 0 };
        Duration::from_millis(millis + fastrand::u64(0..=spread))
    }
}

/// A retried call's final outcome and what it cost.
#[derive(Debug, Clone)]
pub struct RetryResult<T, E> {
    /// Success, or the error of the last attempt.
    pub result: Result<T, E>,
    /// Calls made, including the first.
    pub attempts: u32,
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Calls `operation` with the attempt number (from 0) until it succeeds,
/// `should_retry` declines the error, or `max_retries` retries are used up.
pub async fn execute_with_retry_async<T, E, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: R,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let started = Instant::now();
    let mut attempt = 0;

    let result = loop {
        let outcome = operation(attempt).await;
        let retry = match &outcome {
            Ok(_) => false,
            Err(error) => attempt < config.max_retries && should_retry(error),
        };
        if !retry {
            break outcome;
        }
        attempt += 1;
        let pause = config.calculate_delay(attempt);
        if !pause.is_zero() {
            sleep(pause).await;
        }
    };

    RetryResult {
        result,
        attempts: attempt + 1,
        total_duration: started.elapsed(),
    }
}

/// Whether a provider failure message describes a transient condition.
///
/// Messages built from an HTTP status (`HTTP <code> ...`) retry only for 408,
/// 429 and 5xx. Anything else is a transport failure (refused, reset, timed
/// out) and retries.
pub fn is_retryable_error(message: &str) -> bool {
    match http_status(message) {
        Some(code) => code == 408 || code == 429 || (500..600).contains(&code),
        None => true,
    }
}

fn http_status(message: &str) -> Option<u16> {
    let rest = message.trim_start().strip_prefix("HTTP ")?;
    let digits = rest.split(|c: char| !c.is_ascii_digit()).next()?;
    digits.parse().ok()
}
