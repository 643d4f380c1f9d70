//! Scheduled events.
//!
//! An [`Event`] requests the firing of an actor at a given [`Tag`]. Events are
//! totally ordered by timestamp, microstep, depth and priority, in this order
//! of precedence (see [`Event::schedule_cmp`]). Depth and priority only break
//! ties between simultaneous events: two events have the same tag whenever
//! their timestamps and microsteps match.
use std::cmp::Ordering;

use crate::actor::ActorId;
use crate::ports::PortId;
use crate::time::{Microstep, Tag, Time};

/// Topological rank of an actor or port in the actor graph.
///
/// Simultaneous events are processed by increasing depth, so that upstream
/// actors fire before downstream ones.
pub type Depth = u32;

/// Secondary tie-break between simultaneous events of equal depth.
pub type Priority = i32;

/// The recipient of an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// The container of the director.
    ///
    /// Events targeting the container carry no actor firing and only force the
    /// director to advance its tag, as does the stop event.
    Container,
    /// An actor managed by the director.
    Actor(ActorId),
}

/// A request to fire an actor at a given tag.
///
/// Events are immutable once created. The actor and the port are non-owning
/// identifiers, only used for identity comparison and dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    target: Target,
    port: Option<PortId>,
    tag: Tag,
    depth: Depth,
    priority: Priority,
}

impl Event {
    /// Creates a pure event (not triggered by a port) with null priority.
    pub fn new(target: Target, time: Time, microstep: Microstep, depth: Depth) -> Self {
        Self {
            target,
            port: None,
            tag: Tag::new(time, microstep),
            depth,
            priority: 0,
        }
    }

    /// Creates a trigger event signalling the arrival of a token at a port.
    pub fn trigger(
        actor: ActorId,
        port: PortId,
        time: Time,
        microstep: Microstep,
        depth: Depth,
    ) -> Self {
        Self {
            target: Target::Actor(actor),
            port: Some(port),
            tag: Tag::new(time, microstep),
            depth,
            priority: 0,
        }
    }

    /// Returns a copy of this event with the specified priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;

        self
    }

    /// Returns the recipient of the event.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns the actor to be fired, unless the event targets the container.
    pub fn actor(&self) -> Option<ActorId> {
        match self.target {
            Target::Actor(actor) => Some(actor),
            Target::Container => None,
        }
    }

    /// Returns the triggering port for trigger events.
    pub fn port(&self) -> Option<PortId> {
        self.port
    }

    /// Returns the tag of the event.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the timestamp of the event.
    pub fn time(&self) -> Time {
        self.tag.time
    }

    /// Returns the microstep of the event.
    pub fn microstep(&self) -> Microstep {
        self.tag.microstep
    }

    /// Returns the depth of the event.
    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Returns the priority of the event.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Checks whether both events are simultaneous.
    pub fn has_same_tag(&self, other: &Event) -> bool {
        self.tag == other.tag
    }

    /// Checks whether both events are simultaneous and fire the same
    /// recipient.
    pub fn has_same_tag_and_target(&self, other: &Event) -> bool {
        self.tag == other.tag && self.target == other.target
    }

    /// Compares the scheduling order of two events: timestamp, microstep,
    /// depth and priority, all ascending.
    ///
    /// Events which compare equal are processed in insertion order.
    pub fn schedule_cmp(&self, other: &Event) -> Ordering {
        (self.tag, self.depth, self.priority).cmp(&(other.tag, other.depth, other.priority))
    }

    /// Returns the unbounded calendar bucket index of the event, that is
    /// `floor(timestamp / bin_width)`.
    ///
    /// The bin width is expected to be strictly positive.
    pub fn virtual_bucket(&self, bin_width: f64) -> i64 {
        // Float-to-int casts saturate, which is the desired behavior for
        // infinite timestamps.
        (self.tag.time.as_secs() / bin_width).floor() as i64
    }
}
