//! Superdense model time.
//!
//! This module provides most notably:
//!
//! * [`Time`]: a real-valued model timestamp with a total order,
//! * [`Tag`]: a timestamp complemented by a microstep, which positions an event
//!   in superdense time,
//! * [`Clock`]: a trait for types that can pace a simulation against a wall
//!   clock, implemented for instance by [`SystemClock`] and
//!   [`AutoSystemClock`].
//!
//! In superdense time, several causally related events may occur at the same
//! real-valued timestamp. They are then distinguished by their microstep, a
//! counter which orders zero-time chains of events. Tags are therefore ordered
//! by timestamp first and by microstep second.
//!
//!
//! # Examples
//!
//! ```
//! use superdense::time::{Tag, Time};
//!
//! let t = Time::from_secs(1.5);
//!
//! assert!(Tag::new(t, 0) < Tag::new(t, 1));
//! assert!(Tag::new(t, 7) < Tag::new(Time::from_secs(2.0), 0));
//! ```

mod clock;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;
use std::time::Duration;

pub use clock::{AutoSystemClock, Clock, NoClock, SyncStatus, SystemClock};

/// Index of an event within a single timestamp in superdense time.
pub type Microstep = u32;

/// A model timestamp, in seconds.
///
/// `Time` wraps an `f64` which is guaranteed not to be NaN, so that timestamps
/// are totally ordered. Negative zero is normalized to positive zero.
#[derive(Copy, Clone, Default)]
pub struct Time(f64);

impl Time {
    /// The origin of model time.
    pub const ZERO: Self = Self(0.0);

    /// A timestamp that is later than any finite timestamp.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Creates a timestamp from a number of seconds, or returns `None` if the
    /// argument is NaN.
    pub fn new(secs: f64) -> Option<Self> {
        if secs.is_nan() {
            return None;
        }

        // Adding positive zero turns -0.0 into +0.0.
        Some(Self(secs + 0.0))
    }

    /// Creates a timestamp from a number of seconds.
    ///
    /// # Panics
    ///
    /// This will panic if the argument is NaN.
    pub fn from_secs(secs: f64) -> Self {
        Self::new(secs).expect("model time cannot be NaN")
    }

    /// Returns the timestamp as a number of seconds.
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Returns `true` unless the timestamp is infinite.
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Returns the duration elapsed since an earlier timestamp, or a zero
    /// duration if `earlier` is not in the past of `self`.
    pub fn duration_since(self, earlier: Time) -> Duration {
        Duration::try_from_secs_f64(self.0 - earlier.0).unwrap_or(Duration::ZERO)
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Time {
        Time(self.0 + rhs.as_secs_f64())
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The position of an event in superdense time.
///
/// The derived order compares the timestamp first and the microstep second.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    /// The model timestamp.
    pub time: Time,
    /// The microstep within the timestamp.
    pub microstep: Microstep,
}

impl Tag {
    /// Creates a new tag.
    pub fn new(time: Time, microstep: Microstep) -> Self {
        Self { time, microstep }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.time, self.microstep)
    }
}
