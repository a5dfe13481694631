use std::time::{Duration, Instant};

/// Time source that paces control loops.
///
/// The loop's only suspension point is `sleep`. Simulations implement this to
/// advance their plant instead of waiting on the wall clock.
pub trait Clock: Send + Sync {
    /// Suspend the calling loop for one sampling period
    fn sleep(&self, period: Duration);

    /// Monotonic time elapsed since the clock was created
    fn now(&self) -> Duration;
}

/// Wall-clock time backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn sleep(&self, period: Duration) {
        std::thread::sleep(period);
    }

    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}
