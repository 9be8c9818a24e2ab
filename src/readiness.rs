//! # 就绪轮询
//!
//! 等待某个条件成立或超时。条件在调用时立即求值一次，之后按固定间隔重试，
//! 直到条件成立或已用时间达到超时。
//!
//! 单次求值返回 `Err` 或发生 panic 时视为“尚未就绪”，不会中断轮询。

use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures::FutureExt;
use thiserror::Error;
use tokio::time::{sleep, Instant};

/// Result of a single poll invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Satisfied,
    TimedOut,
}

impl PollOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("poll interval must be greater than zero")]
pub struct ZeroIntervalError;

/// Timeout and interval of a poll
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(timeout: Duration, interval: Duration) -> Result<PollConfig, ZeroIntervalError> {
        if interval.is_zero() {
            return Err(ZeroIntervalError);
        }
        Ok(PollConfig { timeout, interval })
    }

    pub async fn poll<F, E>(&self, condition: F) -> PollOutcome
    where
        F: FnMut() -> Result<bool, E>,
        E: Display,
    {
        poll(condition, self.timeout, self.interval).await
    }

    pub async fn poll_until<F>(&self, condition: F) -> PollOutcome
    where
        F: FnMut() -> bool,
    {
        poll_until(condition, self.timeout, self.interval).await
    }

    pub async fn poll_async<F, Fut, E>(&self, condition: F) -> PollOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
        E: Display,
    {
        poll_async(condition, self.timeout, self.interval).await
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            timeout: Self::DEFAULT_TIMEOUT,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

fn settle<E: Display>(evaluation: Result<Result<bool, E>, Box<dyn std::any::Any + Send>>) -> bool {
    match evaluation {
        Ok(Ok(ready)) => ready,
        Ok(Err(e)) => {
            tracing::trace!("readiness condition failed: {}", e);
            false
        }
        Err(_) => {
            tracing::debug!("readiness condition panicked");
            false
        }
    }
}

/// Deadline `timeout` from now, capped at roughly thirty years
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}

/// Time left until `deadline`, or `None` once it has passed
fn remaining(deadline: Instant) -> Option<Duration> {
    let now = Instant::now();
    (now < deadline).then(|| deadline - now)
}

/// Waits until `condition` returns `Ok(true)` or `timeout` elapses
///
/// A zero `timeout` evaluates the condition exactly once. A zero `interval`
/// is treated as one millisecond.
pub async fn poll<F, E>(mut condition: F, timeout: Duration, interval: Duration) -> PollOutcome
where
    F: FnMut() -> Result<bool, E>,
    E: Display,
{
    let interval = interval.max(Duration::from_millis(1));
    let deadline = deadline_after(timeout);
    let mut evaluations: u32 = 0;

    loop {
        evaluations += 1;
        if settle(panic::catch_unwind(AssertUnwindSafe(&mut condition))) {
            tracing::trace!("condition satisfied after {} evaluations", evaluations);
            return PollOutcome::Satisfied;
        }

        match remaining(deadline) {
            Some(left) => sleep(left.min(interval)).await,
            None => {
                tracing::debug!(
                    "condition not satisfied within {} ms ({} evaluations)",
                    timeout.as_millis(),
                    evaluations
                );
                return PollOutcome::TimedOut;
            }
        }
    }
}

/// [`poll`] for infallible conditions
pub async fn poll_until<F>(mut condition: F, timeout: Duration, interval: Duration) -> PollOutcome
where
    F: FnMut() -> bool,
{
    poll(|| Ok::<bool, std::convert::Infallible>(condition()), timeout, interval).await
}

/// [`poll`] for conditions that have to await something, such as re-fetching a page
pub async fn poll_async<F, Fut, E>(mut condition: F, timeout: Duration, interval: Duration) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    let interval = interval.max(Duration::from_millis(1));
    let deadline = deadline_after(timeout);

    loop {
        let evaluation = match panic::catch_unwind(AssertUnwindSafe(&mut condition)) {
            Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        if settle(evaluation) {
            return PollOutcome::Satisfied;
        }

        match remaining(deadline) {
            Some(left) => sleep(left.min(interval)).await,
            None => {
                tracing::debug!("async condition not satisfied within {} ms", timeout.as_millis());
                return PollOutcome::TimedOut;
            }
        }
    }
}
