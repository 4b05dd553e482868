//! Bounded repetition with state transitions.
//!
//! Retrying a request and walking a paginated connection have the same
//! shape: run a step, inspect the outcome, maybe sleep, go again with new
//! state. [`drive`] is that loop; [`retry`] is the retry instantiation and
//! [`Paginator`](super::Paginator) is the pagination one.

use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::error::Error;

/// Pause inserted after a step that asked to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    None,
    Fixed(Duration),
    /// `base * 2^(n-1)` after step `n`.
    Exponential { base: Duration },
}

impl Delay {
    pub fn after_step(&self, step: u32) -> Duration {
        match *self {
            Delay::None => Duration::ZERO,
            Delay::Fixed(d) => d,
            Delay::Exponential { base } => {
                let exp = step.saturating_sub(1).min(16);
                base.saturating_mul(1u32 << exp)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPolicy {
    pub max_steps: Option<u32>,
    pub delay: Delay,
}

impl LoopPolicy {
    /// `max_retries` retries on top of the first attempt.
    pub fn retries(max_retries: u32, base: Duration) -> Self {
        Self {
            max_steps: Some(max_retries + 1),
            delay: Delay::Exponential { base },
        }
    }

    pub fn pages(pause: Duration) -> Self {
        Self {
            max_steps: None,
            delay: if pause.is_zero() { Delay::None } else { Delay::Fixed(pause) },
        }
    }
}

pub enum Step<S, T> {
    Continue(S),
    Done(T),
}

/// The step budget ran out while the loop still wanted to continue.
#[derive(Debug)]
pub struct Exhausted<S> {
    pub state: S,
    pub steps: u32,
}

pub async fn drive<S, T, F, Fut>(policy: &LoopPolicy, initial: S, mut step: F) -> Result<T, Exhausted<S>>
where
    F: FnMut(S, u32) -> Fut,
    Fut: Future<Output = Step<S, T>>,
{
    let mut state = initial;
    let mut n = 0u32;

    loop {
        n += 1;
        match step(state, n).await {
            Step::Done(value) => return Ok(value),
            Step::Continue(next) => {
                if policy.max_steps.is_some_and(|max| n >= max) {
                    return Err(Exhausted { state: next, steps: n });
                }
                let delay = policy.delay.after_step(n);
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                state = next;
            }
        }
    }
}

/// Runs `op` until it succeeds, fails with an error `retryable` rejects, or
/// the policy's attempt budget is spent. The last error is returned.
pub async fn retry<T, F, Fut, P>(policy: &LoopPolicy, label: &str, mut op: F, retryable: P) -> Result<T, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
    P: Fn(&Error) -> bool,
{
    let max_attempts = policy.max_steps.unwrap_or(u32::MAX);
    let outcome = drive(policy, None::<Error>, |_, attempt| {
        let attempt_fut = op(attempt);
        let retryable = &retryable;
        async move {
            match attempt_fut.await {
                Ok(value) => Step::Done(Ok(value)),
                Err(e) if retryable(&e) => {
                    if attempt < max_attempts {
                        tracing::warn!(
                            "{} failed ({}), retrying (attempt {}/{})",
                            label,
                            e,
                            attempt,
                            max_attempts
                        );
                    }
                    Step::Continue(Some(e))
                }
                Err(e) => Step::Done(Err(e)),
            }
        }
    })
    .await;

    match outcome {
        Ok(result) => result,
        Err(exhausted) => {
            tracing::error!("{} failed after {} attempts", label, exhausted.steps);
            Err(exhausted
                .state
                .unwrap_or(Error::RetriesExhausted(exhausted.steps)))
        }
    }
}
