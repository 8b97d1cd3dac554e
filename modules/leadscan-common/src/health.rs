//! Per-provider health tracking.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::warn;

/// Consecutive-failure counter for one upstream API. Observability only: an
/// unhealthy provider is logged, never blocked.
pub struct ApiHealth {
    name: &'static str,
    consecutive_failures: AtomicU32,
    unhealthy_after: u32,
}

impl ApiHealth {
    pub fn new(name: &'static str, unhealthy_after: u32) -> Self {
        Self {
            name,
            consecutive_failures: AtomicU32::new(0),
            unhealthy_after: unhealthy_after.max(1),
        }
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.unhealthy_after {
            warn!(
                api = self.name,
                consecutive_failures = failures,
                "Provider API is unhealthy"
            );
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.consecutive_failures.load(Ordering::Relaxed) < self.unhealthy_after
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }
}
