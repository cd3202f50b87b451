//! Injected time source
//!
//! Every timer in the core (power-up expiry, combo decay, slow motion) is
//! derived from timestamps read through [`Clock`], never from scheduled
//! callbacks. Tests and replays drive a [`ManualClock`].

use std::cell::Cell;
use std::time::Instant;

/// Milliseconds on the clock's own timeline
pub type Millis = u64;

pub trait Clock {
    fn now(&self) -> Millis;
}

/// Monotonic wall clock, zeroed at construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}
