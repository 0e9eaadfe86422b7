//! Generic retry with exponential backoff for generation calls.
//!
//! The invoker is oblivious to what the operation does; it only inspects
//! success/failure, asks the classifier whether the failure is retryable,
//! and sleeps between attempts. The backoff sleep is the only suspension
//! point: dropping the future mid-sleep cancels cleanly with no dangling
//! timer.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::config::RetryPolicy;
use crate::content::classify::classify;
use crate::error::GenError;

/// Exponential backoff with multiplicative jitter.
///
/// `delay = base * 2^(attempt-1) * (1 + random * jitter_factor)`, where
/// `attempt` counts completed failed attempts starting at 1.
fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let base_ms = policy.base_delay.as_millis() as u64;
    let exp_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let jitter = 1.0 + rand::thread_rng().r#gen::<f64>() * policy.jitter_factor;
    Duration::from_millis((exp_ms as f64 * jitter) as u64)
}

/// Invoke an async operation with retry on transient failures.
///
/// Attempts up to `policy.max_attempts` times. Non-retryable failures and
/// the final attempt's failure surface the original error unchanged. A
/// rate-limit error carrying a server-suggested delay uses that delay
/// instead of the computed backoff.
pub async fn invoke_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, GenError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenError>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let classified = classify(&err);
                if !classified.retryable || attempt >= policy.max_attempts {
                    return Err(err);
                }

                let delay = match &err {
                    GenError::RateLimited {
                        retry_after: Some(suggested),
                    } => *suggested,
                    _ => backoff_delay(policy, attempt),
                };

                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying generation call after transient error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
