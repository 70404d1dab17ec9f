//! Time source for session freshness checks and request pacing.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Supplies the current time and waits on it.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Wait for `duration`; `now` is at least that much later afterwards.
    async fn sleep(&self, duration: Duration);
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
