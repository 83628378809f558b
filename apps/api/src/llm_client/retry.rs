//! Retry wrapper around a single [`Evaluator`] call.
//!
//! `max_attempts` counts every request, including the first. Before retry *k*
//! (1-indexed) the task sleeps `unit * backoff_factor^k`; with the defaults that
//! is 2s, then 4s. Sleeps are async delays on the calling task only.

use std::time::Duration;

use tracing::{error, warn};

use super::{Evaluator, LlmError, RawResponse};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_factor: f64,
    /// Length of one backoff "time unit".
    pub unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_factor,
            unit: Duration::from_secs(1),
        }
    }

    /// Delay before retry number `retry` (1-indexed).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.unit.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 2.0)
    }
}

/// Calls `evaluator` until it succeeds or `policy.max_attempts` requests have failed.
///
/// Exhaustion is reported as [`LlmError::Exhausted`] carrying the last failure's message.
pub async fn evaluate_with_retry(
    evaluator: &dyn Evaluator,
    system_prompt: &str,
    user_prompt: &str,
    temperature: f32,
    policy: &RetryPolicy,
) -> Result<RawResponse, LlmError> {
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match evaluator
            .evaluate(system_prompt, user_prompt, temperature)
            .await
        {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        if attempt >= policy.max_attempts {
            error!("LLM call failed after {attempt} attempt(s): {err}");
            return Err(LlmError::Exhausted {
                attempts: attempt,
                message: err.to_string(),
            });
        }

        let delay = policy.delay_for(attempt);
        warn!(
            "Retry {}/{} after {}ms: {}",
            attempt,
            policy.max_attempts,
            delay.as_millis(),
            err
        );
        tokio::time::sleep(delay).await;
    }
}
