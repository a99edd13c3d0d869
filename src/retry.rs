//! Bounded retry helpers shared by SEO generation and the store client.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Returned when no attempt produced an acceptable value. `last` holds the
/// value from the final attempt.
#[derive(Debug)]
pub struct Exhausted<T> {
    pub attempts: u32,
    pub last: T,
}

/// Runs `operation` until `is_acceptable` approves its output or
/// `max_attempts` runs have been made. At least one attempt is always made.
/// The operation receives the 1-based attempt number.
pub async fn with_retries<T, F, Fut, A>(
    max_attempts: u32,
    operation: F,
    is_acceptable: A,
) -> Result<T, Exhausted<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = T>,
    A: Fn(&T) -> bool,
{
    with_backoff(max_attempts, Duration::ZERO, operation, is_acceptable).await
}

/// Like [`with_retries`], sleeping between attempts with exponential backoff
/// plus jitter, starting from `base_delay`.
pub async fn with_backoff<T, F, Fut, A>(
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
    is_acceptable: A,
) -> Result<T, Exhausted<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = T>,
    A: Fn(&T) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let value = operation(attempt).await;
        if is_acceptable(&value) {
            return Ok(value);
        }
        if attempt >= max_attempts {
            return Err(Exhausted {
                attempts: attempt,
                last: value,
            });
        }
        if !base_delay.is_zero() {
            sleep(backoff_delay(base_delay, attempt)).await;
        }
        attempt += 1;
    }
}

/// Retries a fallible operation while `is_retryable` says its error is
/// transient; the final result is returned as-is either way.
pub async fn retry_transient<T, E, F, Fut, R>(
    max_attempts: u32,
    base_delay: Duration,
    operation: F,
    is_retryable: R,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let accept = |result: &Result<T, E>| match result {
        Ok(_) => true,
        Err(err) => !is_retryable(err),
    };
    match with_backoff(max_attempts, base_delay, operation, accept).await {
        Ok(result) => result,
        Err(exhausted) => exhausted.last,
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(6);
    let scaled = base.saturating_mul(factor);
    let jitter_ms = (base.as_millis() / 2) as u64;
    let jitter = rand::rng().random_range(0..=jitter_ms);
    scaled + Duration::from_millis(jitter)
}
