use std::fmt;

use crate::actor::ActorId;
use crate::event::Target;
use crate::ports::{PortId, Token};
use crate::time::{Microstep, Tag, Time};

use super::kernel::{reborrow, Env, Kernel};
use super::SimulationError;

/// The enclosing director of an embedded director, as seen from inside.
///
/// An embedded director borrows its notion of time from its enclosing
/// director and asks it to be fired whenever its own events require so. This
/// trait is implemented by [`Context`], so that a
/// [`CompositeActor`](crate::actor::CompositeActor) can expose its firing
/// context to its inner director. It can also be implemented by a custom
/// execution environment.
pub trait Executive {
    /// Returns the current model time.
    fn model_time(&self) -> Time;

    /// Returns the current microstep.
    fn microstep(&self) -> Microstep;

    /// Returns the stop time of the execution.
    fn model_stop_time(&self) -> Time;

    /// Requests a firing of the embedded director at the specified tag.
    ///
    /// The time at which the firing was actually scheduled is returned.
    fn fire_container_at(
        &mut self,
        time: Time,
        microstep: Microstep,
    ) -> Result<Time, SimulationError>;
}

/// The view of a director available to an actor while it is initialized or
/// fired.
///
/// A context gives access to model time, to the ports owned by the actor and
/// to the scheduling of future firings.
pub struct Context<'a> {
    kernel: &'a mut Kernel,
    actor: ActorId,
    env: Env<'a>,
}

impl<'a> Context<'a> {
    pub(super) fn new(kernel: &'a mut Kernel, actor: ActorId, env: Env<'a>) -> Self {
        Self { kernel, actor, env }
    }

    /// Returns the identifier of the actor.
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Returns the name of the actor.
    pub fn name(&self) -> &str {
        &self.kernel.actor_names[self.actor.0]
    }

    /// Returns the current model time.
    pub fn time(&self) -> Time {
        self.kernel.time
    }

    /// Returns the current microstep.
    pub fn microstep(&self) -> Microstep {
        self.kernel.microstep
    }

    /// Returns the current tag.
    pub fn tag(&self) -> Tag {
        self.kernel.tag()
    }

    /// Returns the stop time of the execution, which is infinite if no stop
    /// time was set.
    pub fn stop_time(&self) -> Time {
        self.kernel.stop_time
    }

    /// Checks whether the director of the actor is itself embedded in another
    /// director.
    pub fn is_embedded(&self) -> bool {
        self.env.is_some()
    }

    /// Requests a firing of the actor at the specified time and microstep 1.
    ///
    /// If the time is the current time and the current microstep is 1 or
    /// more, the firing is scheduled at the next microstep. The time of the
    /// scheduled firing is returned.
    ///
    /// An error is returned if the time lies in the past, or if the next
    /// microstep exceeds the configured limit.
    pub fn fire_at(&mut self, time: Time) -> Result<Time, SimulationError> {
        self.fire_at_tag(time, 1)
    }

    /// Requests a firing of the actor at the specified tag.
    ///
    /// If the time is the current time and the microstep does not exceed the
    /// current microstep, the firing is scheduled at the next microstep
    /// instead, except during initialization.
    pub fn fire_at_tag(
        &mut self,
        time: Time,
        microstep: Microstep,
    ) -> Result<Time, SimulationError> {
        let target = Target::Actor(self.actor);

        self.kernel
            .fire_at(reborrow(&mut self.env), target, time, microstep)
    }

    /// Requests a firing of the actor at the next microstep of the current
    /// time.
    pub fn fire_at_current_time(&mut self) -> Result<Time, SimulationError> {
        let Tag { time, microstep } = self.kernel.tag();

        self.fire_at_tag(time, microstep)
    }

    /// Requests a firing of another actor of the same director at the
    /// specified tag.
    pub fn fire_actor_at(
        &mut self,
        actor: ActorId,
        time: Time,
        microstep: Microstep,
    ) -> Result<Time, SimulationError> {
        self.kernel.check_actor(actor)?;

        self.kernel
            .fire_at(reborrow(&mut self.env), Target::Actor(actor), time, microstep)
    }

    /// Checks whether an input port of the actor holds a token.
    ///
    /// Ports not owned by the actor never hold tokens.
    pub fn has_token(&self, port: PortId) -> bool {
        self.token_count(port) != 0
    }

    /// Returns the number of tokens held by an input port of the actor.
    pub fn token_count(&self, port: PortId) -> usize {
        self.kernel
            .ports
            .get(port.0)
            .filter(|state| state.owner == Target::Actor(self.actor))
            .map_or(0, |state| state.receiver.len())
    }

    /// Removes and returns the oldest token held by an input port of the
    /// actor.
    pub fn get(&mut self, port: PortId) -> Option<Token> {
        let actor = self.actor;

        self.kernel
            .ports
            .get_mut(port.0)
            .filter(|state| state.owner == Target::Actor(actor))
            .and_then(|state| state.receiver.get())
    }

    /// Sends a token through an output port of the actor.
    ///
    /// The token is delivered immediately to all connected input ports, and
    /// the actors owning them are scheduled to fire at the current time.
    pub fn send(&mut self, port: PortId, token: impl Into<Token>) -> Result<(), SimulationError> {
        let state = self.kernel.port(port)?;
        if state.owner != Target::Actor(self.actor) {
            return Err(SimulationError::InvalidPort {
                port: state.name.clone(),
                reason: "the port is not owned by the sending actor",
            });
        }

        self.kernel.send(port, token.into())
    }

    /// Returns an error reporting a failure of the actor.
    pub fn failure(&self, message: impl Into<String>) -> SimulationError {
        SimulationError::ActorFailed {
            actor: self.name().to_owned(),
            message: message.into(),
        }
    }
}

impl Executive for Context<'_> {
    fn model_time(&self) -> Time {
        self.time()
    }

    fn microstep(&self) -> Microstep {
        self.kernel.microstep
    }

    fn model_stop_time(&self) -> Time {
        self.stop_time()
    }

    fn fire_container_at(
        &mut self,
        time: Time,
        microstep: Microstep,
    ) -> Result<Time, SimulationError> {
        self.fire_at_tag(time, microstep)
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("actor", &self.name())
            .field("tag", &self.tag())
            .finish_non_exhaustive()
    }
}
