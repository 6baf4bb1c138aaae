use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use crate::error::ConfigError;

// Shortest sleep between window re-checks
const MIN_WAIT: Duration = Duration::from_millis(50);

// Sliding-window limiter shared by every outbound AI call in the process.
// Holds one timestamp per granted call, oldest first.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: u32, window_seconds: f64) -> Result<Self, ConfigError> {
        if max_calls == 0 {
            return Err(ConfigError::InvalidMaxCalls(max_calls));
        }
        if !window_seconds.is_finite() || window_seconds <= 0.0 {
            return Err(ConfigError::InvalidWindow(window_seconds));
        }
        let window = Duration::try_from_secs_f64(window_seconds)
            .map_err(|_| ConfigError::InvalidWindow(window_seconds))?;

        Ok(Self {
            max_calls: max_calls as usize,
            window,
            timestamps: Mutex::new(VecDeque::with_capacity(max_calls as usize)),
        })
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // Waits until a slot in the window is free, then claims it.
    // The lock is only held while checking, never while sleeping.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock().await;
                let now = Instant::now();
                prune(&mut timestamps, now, self.window);

                if timestamps.len() < self.max_calls {
                    timestamps.push_back(now);
                    return;
                }

                // full window: oldest entry decides when a slot frees up
                match timestamps.front() {
                    Some(oldest) => self.window.saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };

            let wait = wait.max(MIN_WAIT);
            tracing::debug!(wait_ms = wait.as_millis() as u64, "AI call window full, waiting");
            sleep(wait).await;
        }
    }

    // Number of grants still inside the window
    pub async fn recent_calls(&self) -> usize {
        let mut timestamps = self.timestamps.lock().await;
        prune(&mut timestamps, Instant::now(), self.window);
        timestamps.len()
    }
}

fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = timestamps.front() {
        if now.duration_since(*oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn rejects_zero_calls() {
        assert!(matches!(
            RateLimiter::new(0, 60.0),
            Err(ConfigError::InvalidMaxCalls(0))
        ));
    }

    #[test]
    fn rejects_non_positive_window() {
        assert!(RateLimiter::new(3, 0.0).is_err());
        assert!(RateLimiter::new(3, -1.5).is_err());
        assert!(RateLimiter::new(3, f64::NAN).is_err());
        assert!(RateLimiter::new(3, f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_window_too_long_for_duration() {
        assert!(matches!(
            RateLimiter::new(3, 1e20),
            Err(ConfigError::InvalidWindow(w)) if w == 1e20
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn third_call_waits_for_window() {
        let limiter = RateLimiter::new(2, 1.0).unwrap();
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));

        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(1), "waited {waited:?}");
        assert!(waited < Duration::from_millis(1100), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn old_calls_are_pruned_after_window() {
        let limiter = RateLimiter::new(2, 1.0).unwrap();
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(limiter.recent_calls().await, 2);

        sleep(Duration::from_millis(1001)).await;
        assert_eq!(limiter.recent_calls().await, 0);

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_never_block() {
        let limiter = RateLimiter::new(1, 0.5).unwrap();
        for _ in 0..5 {
            let start = Instant::now();
            limiter.acquire().await;
            assert!(start.elapsed() < Duration::from_millis(50));
            sleep(Duration::from_millis(600)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_never_exceed_window() {
        let limiter = Arc::new(RateLimiter::new(3, 60.0).unwrap());
        let grants = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            let grants = Arc::clone(&grants);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                grants.lock().await.push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let grants = grants.lock().await;
        assert_eq!(grants.len(), 10);
        for t in grants.iter() {
            let in_window = grants
                .iter()
                .filter(|g| *g <= t && t.duration_since(**g) < limiter.window())
                .count();
            assert!(in_window <= 3, "{in_window} grants inside one window");
        }

        // 10 calls at 3 per window needs three rollovers
        assert!(start.elapsed() >= Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn fourth_call_waits_a_full_minute() {
        let limiter = RateLimiter::new(3, 60.0).unwrap();
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(limiter.recent_calls().await, 3);

        sleep(Duration::from_secs(10)).await;
        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(60), "waited {waited:?}");
        assert!(waited < Duration::from_millis(60_100), "waited {waited:?}");
        assert!(limiter.recent_calls().await <= 3);
    }
}
