use crate::queue::{QueueConfig, MAX_LOG_BUCKETS, RESIZE_LAG};
use crate::time::{Microstep, Time};

use super::SimulationError;

/// Parameters of a [`Director`](super::Director).
///
/// The builder-style `with_*` methods are provided for convenience; all fields
/// are public.
///
/// With the `serde` feature, the configuration can be deserialized from any
/// format supported by `serde`, missing fields taking their default value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectorConfig {
    /// Model time at which a top-level execution starts.
    pub start_time: f64,
    /// Model time at which the execution stops, if any.
    pub stop_time: Option<f64>,
    /// Whether a top-level execution stops as soon as the event queue is
    /// exhausted.
    pub stop_when_queue_is_empty: bool,
    /// Whether the number of calendar buckets adapts to the number of queued
    /// events.
    pub is_cq_adaptive: bool,
    /// Minimum number of calendar buckets; must be a power of two.
    pub min_bin_count: u32,
    /// Growth and shrink factor of the calendar; must be a power of two.
    pub bin_count_factor: u32,
    /// Whether a top-level execution paces event processing against the wall
    /// clock.
    pub synchronize_to_real_time: bool,
    /// Whether an embedded director refrains from processing events with a
    /// microstep greater than that of its enclosing director.
    pub enforce_microstep_semantics: bool,
    /// Largest microstep that can be scheduled.
    pub microstep_limit: Microstep,
}

impl DirectorConfig {
    /// Sets the start time.
    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;

        self
    }

    /// Sets the stop time.
    pub fn with_stop_time(mut self, stop_time: f64) -> Self {
        self.stop_time = Some(stop_time);

        self
    }

    /// Sets whether the execution stops once the event queue is exhausted.
    pub fn with_stop_when_queue_is_empty(mut self, value: bool) -> Self {
        self.stop_when_queue_is_empty = value;

        self
    }

    /// Sets whether the calendar queue is resized adaptively.
    pub fn with_cq_adaptive(mut self, value: bool) -> Self {
        self.is_cq_adaptive = value;

        self
    }

    /// Sets the minimum number of calendar buckets.
    pub fn with_min_bin_count(mut self, count: u32) -> Self {
        self.min_bin_count = count;

        self
    }

    /// Sets the calendar growth and shrink factor.
    pub fn with_bin_count_factor(mut self, factor: u32) -> Self {
        self.bin_count_factor = factor;

        self
    }

    /// Sets whether event processing is paced against the wall clock.
    ///
    /// The clock used for synchronization is set with
    /// [`Director::set_clock()`](super::Director::set_clock).
    pub fn with_synchronize_to_real_time(mut self, value: bool) -> Self {
        self.synchronize_to_real_time = value;

        self
    }

    /// Sets whether microsteps of an embedded director are bounded by those of
    /// its enclosing director.
    pub fn with_enforce_microstep_semantics(mut self, value: bool) -> Self {
        self.enforce_microstep_semantics = value;

        self
    }

    /// Sets the largest microstep that can be scheduled.
    pub fn with_microstep_limit(mut self, limit: Microstep) -> Self {
        self.microstep_limit = limit;

        self
    }

    /// Checks the consistency of the parameters.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |msg: String| Err(SimulationError::InvalidConfig(msg));

        if Time::new(self.start_time).map_or(true, |t| !t.is_finite()) {
            return invalid(format!("start time {} is not finite", self.start_time));
        }
        if let Some(stop_time) = self.stop_time {
            if stop_time.is_nan() {
                return invalid("stop time is NaN".into());
            }
            if stop_time < self.start_time {
                return invalid(format!(
                    "stop time {stop_time} precedes start time {}",
                    self.start_time
                ));
            }
        }
        if !self.min_bin_count.is_power_of_two() {
            return invalid(format!(
                "minimum bin count {} is not a power of two",
                self.min_bin_count
            ));
        }
        if self.min_bin_count > 1 << MAX_LOG_BUCKETS {
            return invalid(format!(
                "minimum bin count {} exceeds the maximum of {}",
                self.min_bin_count,
                1u32 << MAX_LOG_BUCKETS
            ));
        }
        if !self.bin_count_factor.is_power_of_two() || self.bin_count_factor < 2 {
            return invalid(format!(
                "bin count factor {} is not a power of two greater than 1",
                self.bin_count_factor
            ));
        }
        if self.microstep_limit == 0 {
            return invalid("microstep limit is zero".into());
        }

        Ok(())
    }

    /// Returns the start time.
    ///
    /// The configuration must have been validated.
    pub(super) fn start(&self) -> Time {
        Time::from_secs(self.start_time)
    }

    /// Returns the stop time, or infinity if none is set.
    ///
    /// The configuration must have been validated.
    pub(super) fn stop(&self) -> Time {
        self.stop_time.map_or(Time::INFINITY, Time::from_secs)
    }

    /// Returns the configuration of the event queue.
    ///
    /// The configuration must have been validated.
    pub(super) fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            log_min_buckets: self.min_bin_count.trailing_zeros(),
            log_bin_count_factor: self.bin_count_factor.trailing_zeros(),
            resize_enabled: self.is_cq_adaptive,
            resize_lag: RESIZE_LAG,
            ..QueueConfig::default()
        }
    }
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: None,
            stop_when_queue_is_empty: true,
            is_cq_adaptive: true,
            min_bin_count: 2,
            bin_count_factor: 2,
            synchronize_to_real_time: false,
            enforce_microstep_semantics: false,
            microstep_limit: Microstep::MAX,
        }
    }
}
