//! Scheduling state shared by a director and the actors it fires.
use std::collections::HashSet;
use std::fmt;

use tracing::{trace, warn};

use crate::actor::ActorId;
use crate::event::{Depth, Event, Target};
use crate::ports::{PortId, PortKind, PortState, Token};
use crate::queue::CalendarQueue;
use crate::time::{Clock, Microstep, NoClock, SyncStatus, Tag, Time};

use super::{Executive, SimulationError};

/// The enclosing director of an embedded director, if any.
pub(super) type Env<'a> = Option<&'a mut dyn Executive>;

/// Reborrows the enclosing director for a shorter lifetime.
pub(super) fn reborrow<'s>(env: &'s mut Env<'_>) -> Env<'s> {
    match env {
        Some(env) => {
            let env: &'s mut dyn Executive = &mut **env;

            Some(env)
        }
        None => None,
    }
}

/// Event queue, model time and ports of a director.
pub(super) struct Kernel {
    pub(super) name: String,
    pub(super) queue: CalendarQueue,
    pub(super) ports: Vec<PortState>,
    pub(super) actor_names: Vec<String>,
    pub(super) actor_depths: Vec<Depth>,
    pub(super) disabled_actors: HashSet<ActorId>,
    pub(super) time: Time,
    pub(super) microstep: Microstep,
    pub(super) stop_time: Time,
    pub(super) microstep_limit: Microstep,
    pub(super) enforce_microstep_semantics: bool,
    pub(super) synchronize_to_real_time: bool,
    /// Set once the clock was synchronized to the first processed event.
    pub(super) clock_started: bool,
    /// Set when the next event lies beyond the stop time.
    pub(super) exceed_stop_time: bool,
    /// Set when the last firing found the event queue exhausted.
    pub(super) no_more_actors_to_fire: bool,
    /// Set while actors are being initialized.
    pub(super) is_initializing: bool,
    pub(super) clock: Box<dyn Clock>,
}

impl Kernel {
    pub(super) fn new(name: String) -> Self {
        Self {
            name,
            queue: CalendarQueue::default(),
            ports: Vec::new(),
            actor_names: Vec::new(),
            actor_depths: Vec::new(),
            disabled_actors: HashSet::new(),
            time: Time::ZERO,
            microstep: 0,
            stop_time: Time::INFINITY,
            microstep_limit: Microstep::MAX,
            enforce_microstep_semantics: false,
            synchronize_to_real_time: false,
            clock_started: false,
            exceed_stop_time: false,
            no_more_actors_to_fire: false,
            is_initializing: false,
            clock: Box::new(NoClock::new()),
        }
    }

    /// Returns the current tag.
    pub(super) fn tag(&self) -> Tag {
        Tag::new(self.time, self.microstep)
    }

    /// Discards all events and tokens and sets the current tag.
    pub(super) fn reset(&mut self, time: Time, microstep: Microstep, stop_time: Time) {
        self.queue.clear();
        for port in &mut self.ports {
            port.receiver.clear();
        }
        self.disabled_actors.clear();
        self.time = time;
        self.microstep = microstep;
        self.stop_time = stop_time;
        self.clock_started = false;
        self.exceed_stop_time = false;
        self.no_more_actors_to_fire = false;
    }

    pub(super) fn target_name(&self, target: Target) -> &str {
        match target {
            Target::Container => &self.name,
            Target::Actor(actor) => &self.actor_names[actor.0],
        }
    }

    pub(super) fn check_actor(&self, actor: ActorId) -> Result<(), SimulationError> {
        if actor.0 < self.actor_names.len() {
            Ok(())
        } else {
            Err(SimulationError::UnknownActor(actor))
        }
    }

    pub(super) fn port(&self, port: PortId) -> Result<&PortState, SimulationError> {
        self.ports
            .get(port.0)
            .ok_or(SimulationError::UnknownPort(port))
    }

    /// Schedules a firing of the target and forwards the request to the
    /// enclosing director, if any.
    ///
    /// Unless actors are being initialized, a firing requested at the current
    /// time with a microstep not past the current one is moved to the next
    /// microstep. The time of the scheduled firing is returned.
    pub(super) fn fire_at(
        &mut self,
        env: Env<'_>,
        target: Target,
        time: Time,
        microstep: Microstep,
    ) -> Result<Time, SimulationError> {
        let mut microstep = microstep;
        if !self.is_initializing && time == self.time && microstep <= self.microstep {
            microstep = self
                .microstep
                .checked_add(1)
                .filter(|&m| m <= self.microstep_limit)
                .ok_or_else(|| self.microstep_overflow(target, time))?;
        }

        self.enqueue_event(target, time, microstep)?;

        if let Some(outer) = env {
            let granted = outer.fire_container_at(time, microstep)?;
            if granted != time {
                return Err(SimulationError::TimingIncompatibility {
                    requested: time,
                    granted,
                });
            }
        }

        Ok(time)
    }

    /// Puts a pure event in the queue.
    ///
    /// A request identical to an already queued one is silently merged.
    pub(super) fn enqueue_event(
        &mut self,
        target: Target,
        time: Time,
        microstep: Microstep,
    ) -> Result<(), SimulationError> {
        let requested = Tag::new(time, microstep);
        if requested < self.tag() {
            return Err(SimulationError::EventInPast {
                actor: self.target_name(target).to_owned(),
                requested,
                current: self.tag(),
            });
        }
        if microstep > self.microstep_limit {
            return Err(self.microstep_overflow(target, time));
        }

        let depth = match target {
            Target::Container => 0,
            Target::Actor(actor) => self.actor_depths[actor.0],
        };
        if !self.queue.put(Event::new(target, time, microstep, depth)) {
            trace!(
                actor = self.target_name(target),
                tag = %requested,
                "firing already scheduled"
            );
        }

        Ok(())
    }

    /// Puts an event in the queue signalling a token arrival at an actor input
    /// port.
    fn enqueue_trigger_event(&mut self, port: PortId) -> Result<(), SimulationError> {
        let state = &self.ports[port.0];
        let Target::Actor(actor) = state.owner else {
            return Ok(());
        };
        if self.disabled_actors.contains(&actor) {
            return Ok(());
        }

        let microstep = self.microstep.max(1);
        if microstep > self.microstep_limit {
            return Err(self.microstep_overflow(state.owner, self.time));
        }
        let event = Event::trigger(actor, port, self.time, microstep, state.depth);
        if !self.queue.put(event) {
            trace!(
                actor = %self.actor_names[actor.0],
                port = %state.name,
                "firing already scheduled"
            );
        }

        Ok(())
    }

    /// Sends a token to all destinations of a source port.
    pub(super) fn send(&mut self, from: PortId, token: Token) -> Result<(), SimulationError> {
        let source = self.port(from)?;
        if !source.is_source() {
            return Err(SimulationError::InvalidPort {
                port: source.name.clone(),
                reason: "tokens can only be sent from output ports",
            });
        }

        for i in 0..source.destinations.len() {
            let destination = self.ports[from.0].destinations[i];
            self.ports[destination.0].receiver.put(token.clone());
            self.enqueue_trigger_event(destination)?;
        }

        Ok(())
    }

    /// Checks whether a boundary output port holds tokens.
    pub(super) fn has_pending_outputs(&self) -> bool {
        self.ports.iter().any(|port| {
            port.owner == Target::Container
                && port.kind == PortKind::Output
                && port.receiver.has_token()
        })
    }

    /// Removes the earliest event from the queue and returns its target,
    /// advancing the current tag to that of the event.
    ///
    /// Subsequent events with the same tag and target are discarded, as are
    /// events targeting disabled actors. `None` is returned if the queue is
    /// empty, if the earliest event lies beyond the stop time, or if it lies
    /// beyond the current tag of the enclosing director.
    pub(super) fn next_actor_to_fire(
        &mut self,
        env: &Env<'_>,
    ) -> Result<Option<Target>, SimulationError> {
        let mut first: Option<Event> = None;

        while let Some(&next) = self.queue.get() {
            if let Some(outer) = env {
                let outer_time = outer.model_time();
                if next.time() > outer_time {
                    break;
                }
                if self.enforce_microstep_semantics
                    && next.time() == outer_time
                    && next.microstep() > outer.microstep()
                {
                    break;
                }
            }

            if let Some(first) = &first {
                if !next.has_same_tag_and_target(first) {
                    break;
                }
                self.queue.take();
                continue;
            }

            if next.time() > self.stop_time {
                self.exceed_stop_time = true;
                break;
            }

            let event = self.queue.take();
            if let Target::Actor(actor) = event.target() {
                if self.disabled_actors.contains(&actor) {
                    trace!(
                        actor = %self.actor_names[actor.0],
                        "event of disabled actor discarded"
                    );
                    continue;
                }
            }
            if event.tag() < self.tag() {
                return Err(SimulationError::TagRegression {
                    next: event.tag(),
                    current: self.tag(),
                });
            }

            if env.is_none()
                && self.synchronize_to_real_time
                && (event.time() > self.time || !self.clock_started)
            {
                self.clock_started = true;
                if let SyncStatus::OutOfSync(lag) = self.clock.synchronize(event.time()) {
                    warn!(
                        lag = ?lag,
                        tag = %event.tag(),
                        "real-time synchronization lost"
                    );
                }
            }

            self.time = event.time();
            self.microstep = event.microstep();
            first = Some(event);
        }

        Ok(first.map(|event| event.target()))
    }

    /// Checks whether the earliest queued event has the current tag.
    pub(super) fn check_for_next_event(&mut self) -> Result<bool, SimulationError> {
        let current = self.tag();
        let Some(next) = self.queue.get() else {
            return Ok(true);
        };
        let next = next.tag();

        if next < current {
            return Err(SimulationError::TagRegression { next, current });
        }

        Ok(next == current)
    }

    fn microstep_overflow(&self, target: Target, time: Time) -> SimulationError {
        SimulationError::MicrostepOverflow {
            actor: self.target_name(target).to_owned(),
            time,
        }
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("name", &self.name)
            .field("tag", &self.tag())
            .field("stop_time", &self.stop_time)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}
