use std::time::Duration;

/// Delay between watcher ticks: the poll interval while healthy, doubling
/// per consecutive failure up to a ceiling.
#[derive(Debug, Clone)]
pub(super) struct Backoff {
    poll_interval: Duration,
    max_backoff: Duration,
    consecutive_failures: u32,
}

impl Backoff {
    pub(super) fn new(poll_interval: Duration, max_backoff: Duration) -> Self {
        Self {
            poll_interval,
            max_backoff: max_backoff.max(poll_interval),
            consecutive_failures: 0,
        }
    }

    pub(super) fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub(super) fn on_success(&mut self) -> Duration {
        self.consecutive_failures = 0;
        self.poll_interval
    }

    pub(super) fn on_failure(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let exponent = self.consecutive_failures.min(16);
        self.poll_interval
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}
