use std::time::Duration;

/// Recurring timer driven by the fixed tick.
///
/// A disarmed timer never fires. Re-arming discards any accumulated time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeatTimer {
    interval: Option<Duration>,
    elapsed: Duration,
}

impl RepeatTimer {
    pub fn armed(interval: Duration) -> Self {
        let mut timer = Self::default();
        timer.arm(interval);
        timer
    }

    /// A zero interval leaves the timer disarmed.
    pub fn arm(&mut self, interval: Duration) {
        self.interval = (!interval.is_zero()).then_some(interval);
        self.elapsed = Duration::ZERO;
    }

    pub fn cancel(&mut self) {
        self.interval = None;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Advances the timer and returns how many interval boundaries were crossed.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        let Some(interval) = self.interval else {
            return 0;
        };
        self.elapsed = self.elapsed.saturating_add(dt);
        let mut fired = 0;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            fired += 1;
        }
        fired
    }
}
