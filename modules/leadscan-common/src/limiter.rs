//! Rolling-window rate limiter for outbound provider calls.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Caps calls to one provider at `max_calls` per rolling `window`, shared
/// process-wide. `acquire` waits for capacity instead of failing; the slot
/// is consumed at acquisition time.
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            window,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until a call slot is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut calls = self.calls.lock().await;
                let now = Instant::now();
                while calls
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    calls.pop_front();
                }
                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    None
                } else {
                    // The oldest call ages out first; wait for it.
                    calls
                        .front()
                        .map(|t| self.window.saturating_sub(now.duration_since(*t)))
                }
            };
            match wait {
                None => return,
                Some(delay) => {
                    let delay = delay.max(Duration::from_millis(10));
                    debug!(delay_ms = delay.as_millis() as u64, "Rate limit reached, waiting");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
