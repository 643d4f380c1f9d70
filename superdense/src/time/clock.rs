use std::time::{Duration, Instant, SystemTime};

use tai_time::{MonotonicClock, MonotonicTime};

use crate::time::Time;

/// A type that can be used to pace a simulation against a wall clock.
///
/// This trait abstracts over different types of clocks, such as
/// as-fast-as-possible and real-time clocks.
///
/// A clock is only consulted by a top-level director configured to synchronize
/// to real time, see
/// [`DirectorConfig::with_synchronize_to_real_time()`](crate::director::DirectorConfig::with_synchronize_to_real_time).
pub trait Clock: Send {
    /// Blocks until the deadline.
    fn synchronize(&mut self, deadline: Time) -> SyncStatus;
}

/// The current synchronization status of a clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// The clock is synchronized.
    Synchronized,
    /// The deadline has already elapsed and lags behind the current clock time
    /// by the duration given in the payload.
    OutOfSync(Duration),
}

/// A dummy [`Clock`] that ignores synchronization.
///
/// Choosing this clock effectively makes the simulation run as fast as
/// possible.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoClock {}

impl NoClock {
    /// Constructs a new `NoClock` object.
    pub fn new() -> Self {
        Self {}
    }
}

impl Clock for NoClock {
    /// Returns immediately with status `SyncStatus::Synchronized`.
    fn synchronize(&mut self, _: Time) -> SyncStatus {
        SyncStatus::Synchronized
    }
}

/// A real-time [`Clock`] based on the system's monotonic clock.
///
/// This clock accepts an arbitrary reference time and remains synchronized with
/// the system's monotonic clock. One second of model time lasts one second of
/// wall clock time.
///
/// Deadlines too far in the future to be represented on the wall clock are
/// never waited for.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    /// Wall clock, reading the epoch at the reference instant.
    clock: MonotonicClock,
    model_ref: Time,
}

impl SystemClock {
    /// Constructs a `SystemClock` with an offset between model time and wall
    /// clock specified by a model time matched to an [`Instant`] timestamp.
    ///
    /// The provided reference time may lie in the past or in the future.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    ///
    /// use superdense::time::{SystemClock, Time};
    ///
    /// // Make model time 0 correspond to 1s from now.
    /// let clock = SystemClock::from_instant(Time::ZERO, Instant::now() + Duration::from_secs(1));
    /// # let _ = clock;
    /// ```
    pub fn from_instant(model_ref: Time, wall_clock_ref: Instant) -> Self {
        Self {
            clock: MonotonicClock::init_from_instant(MonotonicTime::EPOCH, wall_clock_ref),
            model_ref,
        }
    }

    /// Constructs a `SystemClock` with an offset between model time and wall
    /// clock specified by a model time matched to a [`SystemTime`] timestamp.
    ///
    /// The provided reference time may lie in the past or in the future.
    ///
    /// Note that, even though the wall clock reference is specified with the
    /// (non-monotonic) system clock, the [`synchronize()`](Clock::synchronize)
    /// method will still use the system's _monotonic_ clock. The two clocks
    /// are only matched at construction time.
    pub fn from_system_time(model_ref: Time, wall_clock_ref: SystemTime) -> Self {
        Self {
            clock: MonotonicClock::init_from_system_time(MonotonicTime::EPOCH, wall_clock_ref),
            model_ref,
        }
    }
}

impl Clock for SystemClock {
    /// Blocks until the system time corresponds to the specified model time.
    fn synchronize(&mut self, deadline: Time) -> SyncStatus {
        let offset = deadline.as_secs() - self.model_ref.as_secs();
        let Some(deadline) = wall_clock_offset(offset) else {
            return if offset > 0.0 {
                SyncStatus::Synchronized
            } else {
                SyncStatus::OutOfSync(Duration::MAX)
            };
        };
        let now = self.clock.now();
        if now <= deadline {
            spin_sleep::sleep(deadline.duration_since(now));

            return SyncStatus::Synchronized;
        }

        SyncStatus::OutOfSync(now.duration_since(deadline))
    }
}

/// An automatically initialized real-time [`Clock`] based on the system's
/// monotonic clock.
///
/// This clock is similar to [`SystemClock`] except that the first call to
/// [`synchronize()`](Clock::synchronize) never blocks and implicitly defines
/// the reference time. In other words, the clock starts running on its first
/// invocation.
#[derive(Copy, Clone, Debug, Default)]
pub struct AutoSystemClock {
    inner: Option<SystemClock>,
}

impl AutoSystemClock {
    /// Constructs a new `AutoSystemClock`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for AutoSystemClock {
    /// Initializes the time reference and returns immediately on the first
    /// call, otherwise blocks until the system time corresponds to the
    /// specified model time.
    fn synchronize(&mut self, deadline: Time) -> SyncStatus {
        match &mut self.inner {
            None => {
                let now = Instant::now();
                self.inner = Some(SystemClock::from_instant(deadline, now));

                SyncStatus::Synchronized
            }
            Some(clock) => clock.synchronize(deadline),
        }
    }
}

/// Returns the wall clock reading at an offset in seconds from the epoch, or
/// `None` if it cannot be represented.
fn wall_clock_offset(offset: f64) -> Option<MonotonicTime> {
    if offset >= 0.0 {
        MonotonicTime::EPOCH.checked_add(Duration::try_from_secs_f64(offset).ok()?)
    } else {
        MonotonicTime::EPOCH.checked_sub(Duration::try_from_secs_f64(-offset).ok()?)
    }
}
