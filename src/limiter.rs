//! Fixed-interval rate limiting for batch runs.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval};

/// A rate limit period that is never zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NonZeroPeriod(Duration);

impl NonZeroPeriod {
    /// Returns `None` for a zero duration.
    pub fn new(period: Duration) -> Option<Self> {
        (!period.is_zero()).then_some(Self(period))
    }

    /// The wrapped duration.
    pub fn get(self) -> Duration {
        self.0
    }
}

/// Hands out one permit per `period`. The first permit is immediate.
///
/// Permits never accumulate: if the caller is slow, the next permit is available
/// right away and the schedule restarts from there.
#[derive(Debug)]
pub struct FixedIntervalLimiter {
    ticker: Interval,
}

impl FixedIntervalLimiter {
    /// Creates a limiter handing out one permit per `period`.
    pub fn new(period: NonZeroPeriod) -> Self {
        let mut ticker = interval(period.get());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { ticker }
    }

    /// The spacing between permits.
    pub fn period(&self) -> Duration {
        self.ticker.period()
    }

    /// Waits for the next permit and returns when it was granted.
    pub async fn acquire(&mut self) -> Instant {
        self.ticker.tick().await
    }
}
