//! Monotonic time points and intervals
//!
//! [`Time`] represents either a point in time (an offset from a process-wide
//! monotonic epoch) or a duration. Both share one representation so a point
//! plus a duration is a point, and a point minus a point is a duration.
//!
//! The monotonic epoch is captured the first time it is needed, so points are
//! immune to wall-clock adjustments and only meaningful within one process.
//!
//! A default-constructed `Time` is *unset*: `has_time()` returns false until a
//! value is assigned. Arithmetic treats an unset operand as zero.
//!
//! # Clocks
//!
//! Code that samples "now" should go through a [`Clock`] so tests can drive
//! time deterministically with a [`ManualClock`]. [`MonotonicClock`] is the
//! production implementation.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::time::{Duration, Instant};

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// A monotonic point in time or a duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Time {
    value: Option<Duration>,
}

impl Time {
    /// The unset time
    pub const UNSET: Time = Time { value: None };

    /// Sample the monotonic clock
    pub fn now() -> Self {
        Self {
            value: Some(EPOCH.elapsed()),
        }
    }

    /// Create a set time from a duration
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            value: Some(duration),
        }
    }

    /// Create a set time from floating-point seconds
    ///
    /// Negative and NaN values are clamped to zero; values too large for a
    /// `Duration` saturate.
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_nan() || secs <= 0.0 {
            return Self::from_duration(Duration::ZERO);
        }
        Self::from_duration(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }

    /// True if this time holds a value
    pub fn has_time(&self) -> bool {
        self.value.is_some()
    }

    /// Return to the unset state
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Value as floating-point seconds (0.0 when unset)
    pub fn as_secs_f64(&self) -> f64 {
        self.as_duration().as_secs_f64()
    }

    /// Value as a `Duration` (zero when unset)
    pub fn as_duration(&self) -> Duration {
        self.value.unwrap_or_default()
    }
}

impl From<Duration> for Time {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        match (self.value, rhs.value) {
            (None, None) => Time::UNSET,
            (a, b) => Time::from_duration(
                a.unwrap_or_default().saturating_add(b.unwrap_or_default()),
            ),
        }
    }
}

impl Sub for Time {
    type Output = Time;

    /// Difference of two times, saturating at zero
    fn sub(self, rhs: Time) -> Time {
        match (self.value, rhs.value) {
            (None, None) => Time::UNSET,
            (a, b) => Time::from_duration(
                a.unwrap_or_default().saturating_sub(b.unwrap_or_default()),
            ),
        }
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        // Unset sorts before every set value
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(d) => write!(f, "{:.3}s", d.as_secs_f64()),
            None => write!(f, "unset"),
        }
    }
}

/// Source of the current monotonic time
pub trait Clock: Send + Sync {
    fn now(&self) -> Time;
}

/// Clock backed by the process monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Time {
        Time::now()
    }
}

/// Manually driven clock for deterministic tests
///
/// Starts at zero and only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }

    /// Move the clock forward by floating-point seconds
    pub fn advance_secs_f64(&self, secs: f64) {
        self.advance(Time::from_secs_f64(secs).as_duration());
    }

    /// Jump to an absolute offset
    pub fn set(&self, at: Duration) {
        *self.now.lock() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        Time::from_duration(*self.now.lock())
    }
}
