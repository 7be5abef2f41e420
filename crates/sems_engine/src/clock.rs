use std::time::Duration;

use tokio::time::Instant;

/// Fixed tick grid shared by every subscriber loop.
///
/// Interval `n` ends at `epoch + n * period`. Loops wake on the grid
/// boundaries, so all subscribers of a station agree on which interval they
/// are in and the simulator runs once per interval.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    epoch: Instant,
    period: Duration,
}

impl TickClock {
    pub fn new(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    pub fn starting_at(epoch: Instant, period: Duration) -> Self {
        assert!(!period.is_zero(), "tick period must be non-zero");
        TickClock { epoch, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Interval index of `instant`, rounded to the nearest boundary.
    pub fn index_at(&self, instant: Instant) -> u64 {
        let elapsed = instant.saturating_duration_since(self.epoch).as_nanos();
        let period = self.period.as_nanos();
        ((elapsed + period / 2) / period) as u64
    }

    /// First grid boundary strictly after `instant`.
    pub fn next_boundary(&self, instant: Instant) -> Instant {
        let elapsed = instant.saturating_duration_since(self.epoch).as_nanos();
        let period = self.period.as_nanos();
        let offset = (elapsed / period + 1) * period;
        self.epoch + Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX))
    }
}
