//! Simulation time model.
//!
//! Time advances in fixed steps of `dt` seconds.  The canonical counter is the
//! integer `Tick`; elapsed seconds are derived as `tick · dt`, so long runs do
//! not accumulate floating-point drift from repeated addition.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Number of completed iterations.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Fixed-step clock.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Seconds per iteration.
    pub dt:           f64,
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(dt: f64) -> Self {
        Self { dt, current_tick: Tick::ZERO }
    }

    /// Advance by one iteration and return the new tick.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.current_tick = self.current_tick + 1;
        self.current_tick
    }

    /// Simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_time(&self) -> f64 {
        self.current_tick.0 as f64 * self.dt
    }
}
