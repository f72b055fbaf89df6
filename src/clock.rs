use std::time::Instant;

/// Frame clock. `elapsed` and `delta` only change on `update_at`.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    last: Instant,
    elapsed: f64,
    delta: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            elapsed: 0.,
            delta: 0.,
        }
    }

    pub fn update_at(&mut self, now: Instant) {
        let now = now.max(self.last);
        self.delta = (now - self.last).as_secs_f64();
        self.elapsed = (now - self.start).as_secs_f64();
        self.last = now;
    }

    /// Seconds since the clock started, as of the last update.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Seconds between the last two updates.
    pub fn delta(&self) -> f64 {
        self.delta
    }
}
