use std::time::Duration;

/// After a stall (window dragged, process suspended) at most this many ticks
/// are replayed; the rest of the backlog is dropped.
const MAX_CATCH_UP: u32 = 5;

/// Fixed-rate repeating timer.
///
/// Time is passed in as the duration since the shell's loop began, so the
/// same ticker drives the terminal loop (`Instant`) and the browser loop
/// (`performance.now()`).
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Duration,
}

impl Ticker {
    pub fn new(rate_hz: u32) -> Self {
        let period = Duration::from_secs(1) / rate_hz.max(1);
        Self {
            period,
            next_due: period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks that have come due by `elapsed`.
    pub fn due(&mut self, elapsed: Duration) -> u32 {
        if elapsed < self.next_due {
            return 0;
        }

        let behind = (elapsed - self.next_due).as_nanos() / self.period.as_nanos() + 1;
        if behind > MAX_CATCH_UP as u128 {
            self.next_due = elapsed + self.period;
            return MAX_CATCH_UP;
        }

        let behind = behind as u32;
        self.next_due += self.period * behind;
        behind
    }

    /// How long a shell may wait for input before the next tick is due.
    pub fn until_next(&self, elapsed: Duration) -> Duration {
        self.next_due.saturating_sub(elapsed)
    }
}
