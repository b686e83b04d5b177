use parking_lot::Mutex;
use std::time::Instant;

/// Source of the current time in seconds, nodes never sleep.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now(&self) -> f64;
}

/// Clock that only moves when told to, for simulation and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, time: f64) {
        *self.now.lock() = time;
    }

    /// Move the clock forward, returns the new time.
    pub fn advance(&self, dt: f64) -> f64 {
        let mut now = self.now.lock();
        *now += dt;
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }
}

/// Seconds since the clock was created.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
