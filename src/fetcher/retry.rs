use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed delay between attempts
///
/// Applied uniformly to fetch operations: a listing page gets one policy, an
/// entry page another, but the shape is always "try up to N times, sleep a
/// fixed interval between failures, then give up with the last error".
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        debug_assert!(max_attempts >= 1);
        Self {
            max_attempts,
            delay,
        }
    }

    /// Runs `op` until it succeeds or attempts are exhausted
    ///
    /// The closure receives the 1-based attempt number. On failure the last
    /// error is returned; the delay is only slept between attempts, never
    /// after the final one.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}. Retry in {:?}...",
                        label,
                        attempt,
                        self.max_attempts,
                        e,
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "{} failed after {} attempt(s): {}",
                        label,
                        self.max_attempts,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}
