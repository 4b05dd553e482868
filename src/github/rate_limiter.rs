use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Duration;

/// Last known quota as reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitState {
    /// How long to hold off before the next call, if at all. Unknown quota
    /// never blocks; a low quota with no known reset time cannot be waited out.
    pub fn pause_needed(&self, threshold: u32, buffer: Duration, now: DateTime<Utc>) -> Option<Duration> {
        let remaining = self.remaining?;
        if remaining >= threshold {
            return None;
        }
        let reset_at = self.reset_at?;
        let until_reset = (reset_at - now).to_std().unwrap_or(Duration::ZERO);
        Some(until_reset + buffer)
    }
}

/// Shared guard over the API quota. Every request, including concurrent
/// team checks, is admitted through the same state.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimitState>>,
    waiting: Arc<Mutex<()>>,
    threshold: u32,
    buffer: Duration,
}

impl RateLimiter {
    pub fn new(threshold: u32, buffer: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState::default())),
            waiting: Arc::new(Mutex::new(())),
            threshold,
            buffer,
        }
    }

    pub async fn snapshot(&self) -> RateLimitState {
        *self.state.lock().await
    }

    pub async fn pause_needed(&self) -> Option<Duration> {
        let state = self.state.lock().await;
        state.pause_needed(self.threshold, self.buffer, Utc::now())
    }

    /// Admits one call, drawing it from the known budget so concurrent
    /// callers see the spend before the response headers arrive.
    pub async fn admit(&self) {
        let mut state = self.state.lock().await;
        if let Some(remaining) = state.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    /// Exclusive right to wait out a reset window and re-read the quota.
    /// Callers must re-check `pause_needed` once they hold it.
    pub async fn wait_turn(&self) -> MutexGuard<'_, ()> {
        self.waiting.lock().await
    }

    /// Forget the quota after waiting out a reset window.
    pub async fn clear(&self) {
        *self.state.lock().await = RateLimitState::default();
    }

    pub async fn record(&self, remaining: u32, reset_at: Option<DateTime<Utc>>) {
        let mut state = self.state.lock().await;
        state.remaining = Some(remaining);
        if reset_at.is_some() {
            state.reset_at = reset_at;
        }
    }

    pub async fn update_from_headers(&self, headers: &HeaderMap) {
        let Some(remaining) = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
        else {
            return;
        };

        let reset_at = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        self.record(remaining, reset_at).await;
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, state: RateLimitState) {
        *self.state.lock().await = state;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn low_quota_waits_until_reset_plus_buffer() {
        let now = Utc::now();
        let state = RateLimitState {
            remaining: Some(50),
            reset_at: Some(now + chrono::Duration::seconds(30)),
        };
        let pause = state.pause_needed(100, Duration::from_secs(10), now);
        assert_eq!(pause, Some(Duration::from_secs(40)));
    }

    #[test]
    fn healthy_or_unknown_quota_does_not_wait() {
        let now = Utc::now();
        let healthy = RateLimitState {
            remaining: Some(4_000),
            reset_at: Some(now + chrono::Duration::seconds(30)),
        };
        assert_eq!(healthy.pause_needed(100, Duration::from_secs(10), now), None);
        assert_eq!(RateLimitState::default().pause_needed(100, Duration::from_secs(10), now), None);
    }

    #[test]
    fn exhausted_quota_past_reset_only_waits_for_buffer() {
        let now = Utc::now();
        let state = RateLimitState {
            remaining: Some(0),
            reset_at: Some(now - chrono::Duration::seconds(5)),
        };
        assert_eq!(
            state.pause_needed(100, Duration::from_secs(10), now),
            Some(Duration::from_secs(10))
        );
    }

    #[tokio::test]
    async fn headers_update_state_and_admission_spends_budget() {
        let limiter = RateLimiter::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("120"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
        limiter.update_from_headers(&headers).await;

        let state = limiter.snapshot().await;
        assert_eq!(state.remaining, Some(120));
        assert_eq!(state.reset_at, DateTime::from_timestamp(1_700_000_000, 0));

        limiter.admit().await;
        assert_eq!(limiter.snapshot().await.remaining, Some(119));
    }
}
