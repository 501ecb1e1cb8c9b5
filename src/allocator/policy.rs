//! Bounded retry around a single attempt function.

use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Outcome of one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError<E> {
    /// Worth trying again (e.g. a lost priority race)
    Retryable(E),
    /// Stop immediately
    Fatal(E),
}

/// Why [`RetryPolicy::run`] gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The budget (and the final attempt, if enabled) ran out; `last` is the
    /// last retryable error seen.
    Exhausted { attempts: u32, last: E },
    Fatal { attempts: u32, error: E },
    Cancelled { attempts: u32 },
}

/// Exponential backoff with up to 10% jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let base_ms = self.base.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;

        let exponential_base = 2u64.saturating_pow(attempt - 1);
        let capped = base_ms.saturating_mul(exponential_base).min(max_ms);

        let jitter_range = capped / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };
        Duration::from_millis(capped + jitter)
    }
}

/// Retry policy for the priority allocator.
///
/// Retryable failures are retried until `budget` has elapsed since the first
/// attempt. When `final_attempt` is set, one more attempt runs after the
/// budget is spent, so a slow final race can still succeed. Without a
/// `backoff` retries are immediate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub budget: Duration,
    pub final_attempt: bool,
    pub backoff: Option<Backoff>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(300),
            final_attempt: true,
            backoff: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.backoff = Some(Backoff { base, max });
        self
    }

    pub fn without_final_attempt(mut self) -> Self {
        self.final_attempt = false;
        self
    }

    /// Run `attempt` until it succeeds, fails fatally, the budget runs out,
    /// or `cancel` fires. The closure receives the 1-based attempt number.
    ///
    /// Returns the value together with the number of attempts made.
    pub async fn run<T, E, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<(T, u32), RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError<E>>>,
    {
        let start = Instant::now();
        let mut attempts = 0u32;
        let mut final_attempt_used = false;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled { attempts });
            }
            attempts += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
                result = attempt(attempts) => result,
            };

            let last = match result {
                Ok(value) => return Ok((value, attempts)),
                Err(AttemptError::Fatal(error)) => return Err(RetryError::Fatal { attempts, error }),
                Err(AttemptError::Retryable(error)) => error,
            };

            if start.elapsed() >= self.budget {
                if !self.final_attempt || final_attempt_used {
                    return Err(RetryError::Exhausted { attempts, last });
                }
                final_attempt_used = true;
                continue;
            }

            if let Some(backoff) = &self.backoff {
                let delay = backoff.delay(attempts);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts }),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
