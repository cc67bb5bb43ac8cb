// SPDX-License-Identifier: MIT

//! Time abstraction so the scheduler's back-off logic and the depot's event
//! timestamps are deterministically testable.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A clock a test can advance deterministically.
#[derive(Debug)]
pub struct FakeClock {
    inner: Mutex<FakeClockState>,
}

#[derive(Debug)]
struct FakeClockState {
    base: Instant,
    elapsed_ms: u64,
    epoch_ms: u64,
}

impl FakeClock {
    pub fn new(epoch_ms: u64) -> Self {
        Self {
            inner: Mutex::new(FakeClockState {
                base: Instant::now(),
                elapsed_ms: 0,
                epoch_ms,
            }),
        }
    }

    pub fn advance(&self, ms: u64) {
        let mut state = self.inner.lock();
        state.elapsed_ms += ms;
        state.epoch_ms += ms;
    }

    pub fn set_epoch_ms(&self, epoch_ms: u64) {
        self.inner.lock().epoch_ms = epoch_ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock();
        state.base + std::time::Duration::from_millis(state.elapsed_ms)
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
