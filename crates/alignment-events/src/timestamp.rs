//! Simulation Clock
//!
//! Engine timestamps are simulation milliseconds, advanced only by the
//! elapsed time supplied with each tick. Wall-clock time never enters the
//! engine, which keeps replays deterministic.
//!
//! # Example
//!
//! ```
//! use alignment_events::SimTime;
//!
//! let t = SimTime::ZERO.advanced_by(1500);
//! assert_eq!(t.as_millis(), 1500);
//! assert_eq!(t.to_string(), "t+1.500s");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nominal length of one simulation tick in milliseconds.
pub const NOMINAL_TICK_MS: u64 = 1000;

/// A point on the simulation clock, in milliseconds since engine start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns this time moved forward by `elapsed_ms`, saturating.
    pub fn advanced_by(self, elapsed_ms: u64) -> Self {
        Self(self.0.saturating_add(elapsed_ms))
    }

    /// Milliseconds since `earlier`, or zero if `earlier` is later.
    pub fn since(&self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}
