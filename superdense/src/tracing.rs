//! Support for structured logging.
//!
//! # Overview
//!
//! Directors emit [`tracing`] events at the following levels:
//!
//! - `INFO`: lifecycle transitions (preinitialization, initialization,
//!   wrap-up, exhaustion of the event queue),
//! - `DEBUG`: actor firings and depth computation,
//! - `TRACE`: calendar queue resizes, merged duplicate firings and other
//!   scheduling details,
//! - `WARN`: loss of synchronization with the wall clock.
//!
//! Every call into an actor is wrapped in a span with the following metadata:
//!
//! - name: `actor`,
//! - target: `superdense`,
//! - verbosity level: [`Level::INFO`](tracing::Level::INFO),
//! - a unique field called `name`, associated to the actor name provided in
//!   [`Director::add_actor()`](crate::director::Director::add_actor).
//!
//! By default, the [`tracing_subscriber::fmt`][mod@tracing_subscriber::fmt]
//! subscriber timestamps events with the wall clock time. This module provides
//! a [`SimulationTime`] timer which stamps events emitted while an actor fires
//! with the superdense tag of the firing instead.
//!
//! # Configuration
//!
//! ```
//! use superdense::tracing::SimulationTime;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
//!     .with_timer(SimulationTime::with_system_timer())
//!     .init();
//! ```
//!
//! Events emitted outside of actor firings fall back to the system timer:
//!
//! ```text
//! [t=1.500000000 n=2] DEBUG actor{name="counter"}: superdense::director: firing tag=(1.5, 2)
//! 2024-09-10T14:39:24.670921Z  INFO superdense::director: wrapped up director="top" tag=(10, 1)
//! ```
//!
//! The following `RUST_LOG` directive only lets warnings through, together
//! with the `actor` span information:
//!
//! ```text
//! $ RUST_LOG="warn,[actor]=info" cargo run --release my_model
//! ```
use std::fmt;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};

use crate::macros::scoped_thread_local::scoped_thread_local;
use crate::time::Tag;

scoped_thread_local!(pub(crate) static FIRING_TAG: Tag);

/// A timer that can be used in conjunction with the
/// [`tracing-subscriber`][tracing_subscriber] crate to log events using the
/// tag of the current firing instead of (or on top of) the wall clock time.
///
/// See the [module-level documentation][crate::tracing] for more details.
#[derive(Default, Debug)]
pub struct SimulationTime<const VERBOSE: bool, T> {
    sys_timer: T,
}

impl SimulationTime<false, SystemTime> {
    /// Constructs a new simulation timer which falls back to the [`SystemTime`]
    /// timer for events emitted outside of actor firings.
    pub fn with_system_timer() -> Self {
        Self::default()
    }
}

impl SimulationTime<true, SystemTime> {
    /// Constructs a new simulation timer which prepends a [`SystemTime`]
    /// timestamp to all events, followed by the firing tag for events emitted
    /// during actor firings.
    pub fn with_system_timer_always() -> Self {
        Self::default()
    }
}

impl<T: FormatTime> SimulationTime<false, T> {
    /// Constructs a new simulation timer which falls back to the provided
    /// timer for events emitted outside of actor firings.
    pub fn with_custom_timer(sys_timer: T) -> Self {
        Self { sys_timer }
    }
}

impl<T: FormatTime> SimulationTime<true, T> {
    /// Constructs a new simulation timer which prepends a timestamp generated
    /// with the provided timer to all events, followed by the firing tag for
    /// events emitted during actor firings.
    pub fn with_custom_timer_always(sys_timer: T) -> Self {
        Self { sys_timer }
    }
}

impl<const VERBOSE: bool, T: FormatTime> FormatTime for SimulationTime<VERBOSE, T> {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        FIRING_TAG
            .map(|tag| {
                if VERBOSE {
                    self.sys_timer.format_time(w)?;
                    w.write_char(' ')?;
                }
                write!(w, "[t={:.9} n={}]", tag.time, tag.microstep)
            })
            .unwrap_or_else(|| self.sys_timer.format_time(w))
    }
}
