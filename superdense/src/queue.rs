//! Calendar queue.
//!
//! The [`CalendarQueue`] is the event queue of the discrete-event director. It
//! is a bucketed priority queue in the manner of R. Brown's calendar queue
//! (*Calendar queues: a fast O(1) priority queue implementation for the
//! simulation event set problem*, CACM, 1988): events are hashed to one of
//! `2^n` buckets ("days") according to their virtual bucket number
//! `floor(timestamp / bin_width)`, and each bucket keeps its events sorted.
//! When the bin width is well tuned to the density of events, insertion and
//! extraction of the earliest event both have *O*(1) amortized complexity.
//!
//! The number of buckets adapts to the number of queued events. To avoid
//! oscillations caused by transient bursts, the queue is only resized after
//! its size has stayed past a threshold for a number of consecutive
//! operations. On each resize the bin width is re-estimated from a sample of
//! the earliest queued events.
mod bucket;

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use crate::event::Event;

use bucket::{Bucket, Cells};

/// Default number of consecutive over- or under-threshold observations
/// triggering a resize.
pub const RESIZE_LAG: u32 = 32;

/// Default bin width, in seconds.
pub const DEFAULT_BIN_WIDTH: f64 = 2.0;

/// Largest admissible base-2 logarithm of the bucket count.
///
/// The minimum bucket count of a [`QueueConfig`] may not exceed
/// `1 << MAX_LOG_BUCKETS`.
pub const MAX_LOG_BUCKETS: u32 = 24;

/// Maximum number of timestamps sampled to estimate the bin width.
const BIN_WIDTH_SAMPLE_SIZE: usize = 25;

/// Configuration of a [`CalendarQueue`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QueueConfig {
    /// Base-2 logarithm of the minimum (and initial) number of buckets.
    pub log_min_buckets: u32,
    /// Base-2 logarithm of the factor by which the bucket count changes on
    /// resize.
    pub log_bin_count_factor: u32,
    /// Whether the bucket count adapts to the queue size.
    pub resize_enabled: bool,
    /// Number of consecutive observations past a threshold before a resize.
    pub resize_lag: u32,
    /// Bin width used until the first resize.
    pub initial_bin_width: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            log_min_buckets: 1,
            log_bin_count_factor: 1,
            resize_enabled: true,
            resize_lag: RESIZE_LAG,
            initial_bin_width: DEFAULT_BIN_WIDTH,
        }
    }
}

/// An adaptive calendar queue of [`Event`]s.
///
/// Events are extracted in the order defined by [`Event::schedule_cmp`], events
/// which compare equal being extracted in insertion order. At most one event
/// may be queued for a given tag and a given target: see
/// [`put()`](CalendarQueue::put).
pub struct CalendarQueue {
    config: QueueConfig,
    cells: Cells,
    /// Empty until the first insertion.
    buckets: Vec<Bucket>,
    log_bucket_count: u32,
    bucket_mask: usize,
    bin_width: f64,
    /// A lower bound of the virtual bucket numbers of all queued events, from
    /// which the search for the minimum starts.
    min_virtual_bucket: Option<i64>,
    /// Bucket holding the minimum event, valid until the next mutation.
    cached_minimum_bucket: Option<usize>,
    len: usize,
    top_threshold: usize,
    bottom_threshold: usize,
    over_threshold_count: u32,
    under_threshold_count: u32,
    resize_enabled: bool,
}

impl CalendarQueue {
    /// Creates an empty queue.
    ///
    /// # Panics
    ///
    /// This will panic if the initial bin width is not strictly positive and
    /// finite, or if the minimum bucket count exceeds `1 << MAX_LOG_BUCKETS`.
    pub fn new(config: QueueConfig) -> Self {
        assert!(
            config.initial_bin_width > 0.0 && config.initial_bin_width.is_finite(),
            "the bin width must be strictly positive and finite"
        );
        assert!(
            config.log_min_buckets <= MAX_LOG_BUCKETS,
            "the minimum bucket count must not exceed 2^{MAX_LOG_BUCKETS}"
        );

        Self {
            config,
            cells: Cells::new(),
            buckets: Vec::new(),
            log_bucket_count: config.log_min_buckets,
            bucket_mask: 0,
            bin_width: config.initial_bin_width,
            min_virtual_bucket: None,
            cached_minimum_bucket: None,
            len: 0,
            top_threshold: 0,
            bottom_threshold: 0,
            over_threshold_count: 0,
            under_threshold_count: 0,
            resize_enabled: config.resize_enabled,
        }
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue contains no event.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current number of buckets, or 0 before the first insertion.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the current bin width.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Inserts an event.
    ///
    /// The event is rejected and `false` is returned if an event with the same
    /// tag and the same target is already queued. Events differing only by
    /// microstep are distinct.
    pub fn put(&mut self, event: Event) -> bool {
        if self.buckets.is_empty() {
            self.local_init(self.config.log_min_buckets);
        }

        let virtual_bucket = event.virtual_bucket(self.bin_width);
        let idx = self.bucket_index(virtual_bucket);
        if self.buckets[idx].includes(&self.cells, &event) {
            trace!(tag = %event.tag(), "duplicate event rejected");

            return false;
        }

        self.buckets[idx].insert(&mut self.cells, event);
        self.len += 1;
        self.cached_minimum_bucket = None;
        match self.min_virtual_bucket {
            Some(min) if min <= virtual_bucket => {}
            _ => self.min_virtual_bucket = Some(virtual_bucket),
        }

        self.resize(true);

        true
    }

    /// Returns the earliest event without removing it, or `None` if the queue
    /// is empty.
    ///
    /// The location of the earliest event is cached, so that repeated calls
    /// without intervening mutation are cheap.
    pub fn get(&mut self) -> Option<&Event> {
        if self.len == 0 {
            return None;
        }

        let idx = match self.cached_minimum_bucket {
            Some(idx) => idx,
            None => {
                let idx = self.index_of_minimum_bucket();
                self.cached_minimum_bucket = Some(idx);

                idx
            }
        };

        self.buckets[idx].peek(&self.cells)
    }

    /// Removes and returns the earliest event.
    ///
    /// # Panics
    ///
    /// This will panic if the queue is empty. Callers are expected to check
    /// [`is_empty()`](CalendarQueue::is_empty) beforehand.
    pub fn take(&mut self) -> Event {
        assert!(
            self.len != 0,
            "attempted to take an event from an empty calendar queue"
        );

        let idx = match self.cached_minimum_bucket.take() {
            Some(idx) => idx,
            None => self.index_of_minimum_bucket(),
        };
        let event = self.buckets[idx].take(&mut self.cells).unwrap();

        self.len -= 1;
        self.min_virtual_bucket = if self.len == 0 {
            None
        } else {
            Some(event.virtual_bucket(self.bin_width))
        };

        self.resize(false);

        event
    }

    /// Removes an event equal to the argument, if any.
    ///
    /// Returns `true` if the event was found.
    pub fn remove(&mut self, event: &Event) -> bool {
        if self.len == 0 {
            return false;
        }

        let idx = self.bucket_index(event.virtual_bucket(self.bin_width));
        if !self.buckets[idx].remove(&mut self.cells, event) {
            return false;
        }

        // The lower bound on virtual bucket numbers remains valid.
        self.len -= 1;
        self.cached_minimum_bucket = None;
        if self.len == 0 {
            self.min_virtual_bucket = None;
        }

        self.resize(false);

        true
    }

    /// Checks whether an event with the same tag and the same target as the
    /// argument is queued.
    pub fn includes(&self, event: &Event) -> bool {
        if self.len == 0 {
            return false;
        }
        let idx = self.bucket_index(event.virtual_bucket(self.bin_width));

        self.buckets[idx].includes(&self.cells, event)
    }

    /// Removes all events and returns the queue to its uninitialized state.
    pub fn clear(&mut self) {
        *self = Self::new(self.config);
    }

    /// Returns a copy of all queued events in extraction order.
    pub fn to_vec(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.iter(&self.cells))
            .copied()
            .collect();

        // Equal events always share a bucket, so a stable sort preserves their
        // insertion order.
        events.sort_by(Event::schedule_cmp);

        events
    }

    /// Sets up an empty array of `2^log_bucket_count` buckets.
    fn local_init(&mut self, log_bucket_count: u32) {
        let bucket_count = 1usize << log_bucket_count;

        self.log_bucket_count = log_bucket_count;
        self.bucket_mask = bucket_count - 1;
        self.buckets = (0..bucket_count).map(|_| Bucket::default()).collect();
        self.top_threshold = bucket_count << self.config.log_bin_count_factor;
        self.bottom_threshold = bucket_count >> self.config.log_bin_count_factor;
        self.over_threshold_count = 0;
        self.under_threshold_count = 0;
        self.min_virtual_bucket = None;
        self.cached_minimum_bucket = None;
        self.len = 0;
    }

    /// Maps a virtual bucket number to a physical bucket index.
    fn bucket_index(&self, virtual_bucket: i64) -> usize {
        // Two's complement wrapping keeps the mapping periodic for negative
        // virtual bucket numbers too.
        (virtual_bucket as usize) & self.bucket_mask
    }

    /// Finds the bucket holding the earliest event.
    ///
    /// Starting from the lower bound on virtual bucket numbers, the buckets
    /// are visited in ring order, expecting virtual bucket `min + k` at step
    /// `k`. The first bucket whose head belongs to the expected virtual bucket
    /// holds the minimum. If a full turn yields no match, all events lie at
    /// least one "year" ahead and the bucket heads are compared directly.
    ///
    /// The queue must not be empty.
    fn index_of_minimum_bucket(&mut self) -> usize {
        let start = self.min_virtual_bucket.unwrap();

        for k in 0..self.buckets.len() as i64 {
            let virtual_bucket = start.wrapping_add(k);
            let idx = self.bucket_index(virtual_bucket);
            if let Some(head) = self.buckets[idx].peek(&self.cells) {
                if head.virtual_bucket(self.bin_width) == virtual_bucket {
                    self.min_virtual_bucket = Some(virtual_bucket);

                    return idx;
                }
            }
        }

        // Direct search.
        let mut min: Option<(usize, &Event)> = None;
        for (idx, bucket) in self.buckets.iter().enumerate() {
            if let Some(head) = bucket.peek(&self.cells) {
                match min {
                    Some((_, min_head)) if head.schedule_cmp(min_head) != Ordering::Less => {}
                    _ => min = Some((idx, head)),
                }
            }
        }
        let (idx, head) = min.unwrap();
        self.min_virtual_bucket = Some(head.virtual_bucket(self.bin_width));

        idx
    }

    /// Counts consecutive observations of the queue size past the growth (or
    /// shrink) threshold and resizes the queue once the lag is reached.
    fn resize(&mut self, increasing: bool) {
        if !self.resize_enabled {
            return;
        }

        let lag = self.config.resize_lag;
        let factor = self.config.log_bin_count_factor;
        let mut new_log_bucket_count = None;

        if increasing {
            if self.len > self.top_threshold {
                self.over_threshold_count += 1;
                if self.over_threshold_count >= lag {
                    self.over_threshold_count = 0;
                    let log = (self.log_bucket_count + factor).min(MAX_LOG_BUCKETS);
                    if log != self.log_bucket_count {
                        new_log_bucket_count = Some(log);
                    }
                }
            } else {
                self.over_threshold_count = 0;
            }
        } else if self.len < self.bottom_threshold {
            self.under_threshold_count += 1;
            if self.under_threshold_count >= lag {
                self.under_threshold_count = 0;
                new_log_bucket_count = self
                    .log_bucket_count
                    .checked_sub(factor)
                    .filter(|&log| log >= self.config.log_min_buckets && log != self.log_bucket_count);
            }
        } else {
            self.under_threshold_count = 0;
        }

        if let Some(log) = new_log_bucket_count {
            self.rebuild(log);
        }
    }

    /// Redistributes all events over `2^log_bucket_count` buckets after
    /// re-estimating the bin width.
    fn rebuild(&mut self, log_bucket_count: u32) {
        let old_bucket_count = self.buckets.len();

        let mut events = Vec::with_capacity(self.len);
        for bucket in &mut self.buckets {
            while let Some(event) = bucket.take(&mut self.cells) {
                events.push(event);
            }
        }
        events.sort_by(Event::schedule_cmp);

        if let Some(bin_width) = estimate_bin_width(&events) {
            self.bin_width = bin_width;
        }

        self.local_init(log_bucket_count);
        self.resize_enabled = false;
        for event in events {
            self.put(event);
        }
        self.resize_enabled = true;

        trace!(
            old_bucket_count,
            new_bucket_count = self.buckets.len(),
            bin_width = self.bin_width,
            "calendar queue resized"
        );
    }
}

impl Default for CalendarQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl fmt::Debug for CalendarQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarQueue")
            .field("len", &self.len)
            .field("bucket_count", &self.buckets.len())
            .field("bin_width", &self.bin_width)
            .finish_non_exhaustive()
    }
}

/// Estimates a bin width from the earliest timestamps of a sorted slice of
/// events.
///
/// The estimate is three times the average gap between consecutive sampled
/// timestamps, after discarding gaps larger than twice the overall average.
/// `None` is returned when the sample does not yield a strictly positive and
/// finite width.
fn estimate_bin_width(events: &[Event]) -> Option<f64> {
    let sample: Vec<f64> = events
        .iter()
        .take(BIN_WIDTH_SAMPLE_SIZE)
        .map(|event| event.time().as_secs())
        .collect();
    if sample.len() < 2 {
        return None;
    }

    let gaps: Vec<f64> = sample.windows(2).map(|w| w[1] - w[0]).collect();
    let average = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if !(average > 0.0 && average.is_finite()) {
        return None;
    }

    let (sum, count) = gaps
        .iter()
        .filter(|&&gap| gap <= 2.0 * average)
        .fold((0.0, 0usize), |(sum, count), gap| (sum + gap, count + 1));
    let average = if count == 0 { average } else { sum / count as f64 };
    let bin_width = 3.0 * average;

    (bin_width > 0.0 && bin_width.is_finite()).then_some(bin_width)
}
