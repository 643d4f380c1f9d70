//! Actor interface.
//!
//! Actors are the units of behavior managed by a
//! [`Director`](crate::director::Director). The director drives each actor
//! through the following phases:
//!
//! 1. [`preinitialize()`](Actor::preinitialize), once per execution, before
//!    the depths of the actor graph are established,
//! 2. [`initialize()`](Actor::initialize), when actors typically schedule
//!    their first firing with
//!    [`Context::fire_at()`](crate::director::Context::fire_at),
//! 3. any number of firings at increasing tags, each made of
//!    [`prefire()`](Actor::prefire), [`fire()`](Actor::fire) and
//!    [`postfire()`](Actor::postfire),
//! 4. [`wrapup()`](Actor::wrapup), once per execution.
//!
//! An actor is fired at a given tag when it has requested it or when a token
//! has been sent to one of its input ports. Within a tag, actors fire in the
//! order of their depth, so that an actor only fires once all actors upstream
//! of it have fired.
//!
//! # Example
//!
//! ```
//! use superdense::actor::Actor;
//! use superdense::director::{Context, SimulationError};
//! use superdense::ports::PortId;
//! use superdense::time::Time;
//!
//! /// Emits a pulse at a fixed period.
//! struct Clock {
//!     output: PortId,
//!     period: f64,
//! }
//!
//! impl Actor for Clock {
//!     fn initialize(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
//!         cx.fire_at(cx.time())?;
//!
//!         Ok(())
//!     }
//!
//!     fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
//!         cx.send(self.output, ())
//!     }
//!
//!     fn postfire(&mut self, cx: &mut Context<'_>) -> Result<bool, SimulationError> {
//!         let next = Time::from_secs(cx.time().as_secs() + self.period);
//!         cx.fire_at(next)?;
//!
//!         Ok(true)
//!     }
//! }
//! ```
mod composite;

pub use composite::CompositeActor;

use crate::director::{Context, SimulationError};

/// Identifier of an actor managed by a director.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub(crate) usize);

impl ActorId {
    /// Returns the index of the actor within its director.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Trait to be implemented by all actors.
///
/// All methods but [`fire()`](Actor::fire) have a default implementation.
/// Errors returned by any method abort the current execution of the director.
pub trait Actor {
    /// Prepares the actor for execution.
    ///
    /// This is called before depths are computed, so the actor may not
    /// schedule events at this point.
    fn preinitialize(&mut self) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Initializes the actor.
    ///
    /// Firings requested at the current tag during initialization are not
    /// moved to a later microstep.
    fn initialize(&mut self, _: &mut Context<'_>) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Checks whether the actor is ready to fire.
    ///
    /// If `false` is returned, neither [`fire()`](Actor::fire) nor
    /// [`postfire()`](Actor::postfire) are called for this firing.
    fn prefire(&mut self, _: &mut Context<'_>) -> Result<bool, SimulationError> {
        Ok(true)
    }

    /// Fires the actor: reads inputs and produces outputs.
    fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError>;

    /// Commits the state of the actor after a firing.
    ///
    /// If `false` is returned, the actor is disabled and is never fired again
    /// during this execution.
    fn postfire(&mut self, _: &mut Context<'_>) -> Result<bool, SimulationError> {
        Ok(true)
    }

    /// Releases resources at the end of an execution.
    ///
    /// This is called even if the execution was aborted by an error.
    fn wrapup(&mut self) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Checks whether the outputs of the actor are delayed with respect to its
    /// inputs.
    ///
    /// Connections leaving a delay actor are ignored when computing depths,
    /// which makes it possible to close feedback loops through such actors.
    fn is_delay(&self) -> bool {
        false
    }
}
