//! # Manual Logical Clock
//!
//! A `LogicalClock` driven by the host: tests and the replay tool move it
//! forward explicitly. It never moves backwards.

use crate::domain::value_objects::Tick;
use crate::ports::outbound::LogicalClock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Host-driven, non-decreasing clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: AtomicU64,
}

impl ManualClock {
    /// Clock starting at `start`.
    #[must_use]
    pub fn new(start: Tick) -> Self {
        Self {
            tick: AtomicU64::new(start),
        }
    }

    /// Move forward by `ticks` and return the new tick.
    pub fn advance(&self, ticks: Tick) -> Tick {
        let prev = self
            .tick
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(ticks))
            })
            .unwrap_or_else(|t| t);
        prev.saturating_add(ticks)
    }

    /// Move forward to `tick`; earlier values are ignored.
    pub fn advance_to(&self, tick: Tick) -> Tick {
        self.tick.fetch_max(tick, Ordering::SeqCst).max(tick)
    }
}

impl LogicalClock for ManualClock {
    fn now(&self) -> Tick {
        self.tick.load(Ordering::SeqCst)
    }
}
